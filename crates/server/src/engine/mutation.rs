use std::collections::HashSet;

use tracing::{debug, info, instrument};

use crate::engine::ids::IdGenerator;
use crate::engine::permission::PermissionPolicy;
use crate::error::{CollectionError, ValidationError};
use crate::models::resource::{Resource, ResourceId, ResourceInput};
use crate::models::user::ActingUser;

/// In-memory working copy of one course's resources. Persisting it back to the
/// course backend is the caller's concern.
#[derive(Clone, Debug, Default)]
pub struct ResourceCollection {
    resources: Vec<Resource>,
    ids: IdGenerator,
}

impl ResourceCollection {
    /// Fails if two of `resources` share an id.
    pub fn new(resources: Vec<Resource>) -> Result<Self, ValidationError> {
        let mut seen = HashSet::with_capacity(resources.len());
        if let Some(duplicate) = resources.iter().find(|r| !seen.insert(r.id)) {
            return Err(ValidationError::InvalidInput {
                value: duplicate.id.to_string(),
                reason: "resource id appears more than once".to_string(),
            });
        }
        let ids = IdGenerator::seeded(resources.iter().map(|r| r.id));
        Ok(Self { resources, ids })
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn get(&self, id: ResourceId) -> Option<&Resource> {
        self.resources.iter().find(|r| r.id == id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn position(&self, id: ResourceId) -> Result<usize, CollectionError> {
        self.resources
            .iter()
            .position(|r| r.id == id)
            .ok_or(CollectionError::NotFound { id })
    }
}

/// Applies create, update and remove on behalf of one acting user.
pub struct MutationCoordinator<'a> {
    collection: &'a mut ResourceCollection,
    policy: &'a PermissionPolicy,
    actor: &'a ActingUser,
}

impl<'a> MutationCoordinator<'a> {
    pub fn new(
        collection: &'a mut ResourceCollection,
        policy: &'a PermissionPolicy,
        actor: &'a ActingUser,
    ) -> Self {
        Self {
            collection,
            policy,
            actor,
        }
    }

    #[instrument(skip_all, fields(actor = %self.actor.email))]
    pub fn create(&mut self, input: ResourceInput) -> Result<Resource, CollectionError> {
        let input = input.validate()?;
        let resources = &self.collection.resources;
        let id = self
            .collection
            .ids
            .next_id(|candidate| resources.iter().any(|r| r.id == candidate))
            .ok_or(ValidationError::IdsExhausted {
                subject: "resource",
            })?;
        let resource = Resource::from_input(id, input, self.actor);
        self.collection.resources.push(resource.clone());
        info!("created resource {id}");
        Ok(resource)
    }

    #[instrument(skip(self, input), fields(actor = %self.actor.email))]
    pub fn update(
        &mut self,
        id: ResourceId,
        input: ResourceInput,
    ) -> Result<Resource, CollectionError> {
        let index = self.collection.position(id)?;
        self.authorize(id, index)?;
        let input = input.validate()?;
        let resource = &mut self.collection.resources[index];
        resource.apply(input);
        info!("updated resource {id}");
        Ok(resource.clone())
    }

    #[instrument(skip(self), fields(actor = %self.actor.email))]
    pub fn remove(&mut self, id: ResourceId) -> Result<(), CollectionError> {
        let index = self.collection.position(id)?;
        self.authorize(id, index)?;
        self.collection.resources.remove(index);
        info!("removed resource {id}");
        Ok(())
    }

    fn authorize(&self, id: ResourceId, index: usize) -> Result<(), CollectionError> {
        let resource = self.collection.resources.get(index);
        if self.policy.can_mutate(self.actor, resource) {
            return Ok(());
        }
        debug!("rejected mutation of resource {id}");
        Err(CollectionError::PermissionDenied {
            actor: self.actor.email.clone(),
            id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resource::ResourceType;
    use crate::models::user::UserRole;

    fn input(title: &str) -> ResourceInput {
        ResourceInput {
            title: title.to_string(),
            kind: ResourceType::Video,
            description: "x".to_string(),
            link: "y".to_string(),
            ..Default::default()
        }
    }

    fn ada() -> ActingUser {
        ActingUser::new("a@x.com", "Ada", UserRole::Student)
    }

    fn bob() -> ActingUser {
        ActingUser::new("b@x.com", "Bob", UserRole::Student)
    }

    fn seeded_by(actor: &ActingUser) -> (ResourceCollection, ResourceId) {
        let policy = PermissionPolicy::default();
        let mut collection = ResourceCollection::default();
        let id = MutationCoordinator::new(&mut collection, &policy, actor)
            .create(input("Ownership explained"))
            .unwrap()
            .id;
        (collection, id)
    }

    #[test]
    fn create_rejects_empty_title_and_leaves_collection_unchanged() {
        let policy = PermissionPolicy::default();
        let actor = ada();
        let (mut collection, _) = seeded_by(&actor);
        let before = collection.resources().to_vec();

        let err = MutationCoordinator::new(&mut collection, &policy, &actor)
            .create(input(""))
            .unwrap_err();

        assert!(matches!(
            err,
            CollectionError::Validation(ValidationError::MissingField { field: "title" })
        ));
        assert_eq!(collection.resources(), before.as_slice());
    }

    #[test]
    fn create_assigns_distinct_ids_and_attribution() {
        let policy = PermissionPolicy::default();
        let actor = ada();
        let mut collection = ResourceCollection::default();
        let mut coordinator = MutationCoordinator::new(&mut collection, &policy, &actor);

        let created: Vec<Resource> = (0..50)
            .map(|n| coordinator.create(input(&format!("r{n}"))).unwrap())
            .collect();

        let ids: HashSet<ResourceId> = created.iter().map(|r| r.id).collect();
        assert_eq!(ids.len(), 50);
        assert_eq!(collection.len(), 50);
        assert!(collection
            .resources()
            .iter()
            .all(|r| r.contributor_email.as_deref() == Some("a@x.com")
                && r.contributor_name.as_deref() == Some("Ada")));
    }

    #[test]
    fn create_avoids_ids_already_in_the_collection() {
        let policy = PermissionPolicy::default();
        let actor = ada();
        let (template, id) = seeded_by(&actor);
        let mut existing = template.resources()[0].clone();
        existing.id = id + 1;
        let mut collection =
            ResourceCollection::new(vec![template.resources()[0].clone(), existing]).unwrap();

        let created = MutationCoordinator::new(&mut collection, &policy, &actor)
            .create(input("another"))
            .unwrap();
        assert!(created.id > id + 1);
    }

    #[test]
    fn rejects_seed_with_repeated_ids() {
        let (template, id) = seeded_by(&ada());
        let resource = template.resources()[0].clone();

        let err = ResourceCollection::new(vec![resource.clone(), resource]).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::InvalidInput { value, .. } if value == id.to_string()
        ));
    }

    #[test]
    fn create_fails_cleanly_when_top_id_is_taken() {
        let policy = PermissionPolicy::default();
        let actor = ada();
        let (template, _) = seeded_by(&actor);
        let mut last = template.resources()[0].clone();
        last.id = i64::MAX;
        let mut collection = ResourceCollection::new(vec![last]).unwrap();
        let before = collection.resources().to_vec();

        let err = MutationCoordinator::new(&mut collection, &policy, &actor)
            .create(input("one too many"))
            .unwrap_err();

        assert!(matches!(
            err,
            CollectionError::Validation(ValidationError::IdsExhausted { .. })
        ));
        assert_eq!(collection.resources(), before.as_slice());
    }

    #[test]
    fn contributor_can_update_and_keeps_identity() {
        let policy = PermissionPolicy::default();
        let actor = ada();
        let (mut collection, id) = seeded_by(&actor);

        let mut edit = input("Borrowing explained");
        edit.kind = ResourceType::Article;
        let updated = MutationCoordinator::new(&mut collection, &policy, &actor)
            .update(id, edit)
            .unwrap();

        assert_eq!(updated.id, id);
        assert_eq!(updated.title, "Borrowing explained");
        assert_eq!(updated.kind, ResourceType::Article);
        assert_eq!(updated.contributor_email.as_deref(), Some("a@x.com"));
        assert_eq!(collection.get(id), Some(&updated));
    }

    #[test]
    fn instructor_update_keeps_original_contributor() {
        let policy = PermissionPolicy::default();
        let (mut collection, id) = seeded_by(&ada());
        let instructor = ActingUser::new("c@x.com", "Grace", UserRole::Instructor);

        let updated = MutationCoordinator::new(&mut collection, &policy, &instructor)
            .update(id, input("Reviewed"))
            .unwrap();
        assert_eq!(updated.contributor_email.as_deref(), Some("a@x.com"));
    }

    #[test]
    fn stranger_cannot_update_or_remove() {
        let policy = PermissionPolicy::default();
        let (mut collection, id) = seeded_by(&ada());
        let before = collection.resources().to_vec();
        let stranger = bob();
        let mut coordinator = MutationCoordinator::new(&mut collection, &policy, &stranger);

        assert!(matches!(
            coordinator.update(id, input("hijacked")),
            Err(CollectionError::PermissionDenied { id: denied, .. }) if denied == id
        ));
        assert!(matches!(
            coordinator.remove(id),
            Err(CollectionError::PermissionDenied { .. })
        ));
        assert_eq!(collection.resources(), before.as_slice());
    }

    #[test]
    fn permission_is_checked_before_validation() {
        let policy = PermissionPolicy::default();
        let (mut collection, id) = seeded_by(&ada());

        let err = MutationCoordinator::new(&mut collection, &policy, &bob())
            .update(id, input(""))
            .unwrap_err();
        assert!(matches!(err, CollectionError::PermissionDenied { .. }));
    }

    #[test]
    fn invalid_update_leaves_record_unchanged() {
        let policy = PermissionPolicy::default();
        let actor = ada();
        let (mut collection, id) = seeded_by(&actor);
        let before = collection.resources().to_vec();

        let err = MutationCoordinator::new(&mut collection, &policy, &actor)
            .update(id, input("  "))
            .unwrap_err();
        assert!(matches!(err, CollectionError::Validation(_)));
        assert_eq!(collection.resources(), before.as_slice());
    }

    #[test]
    fn missing_ids_are_not_found() {
        let policy = PermissionPolicy::default();
        let instructor = ActingUser::new("c@x.com", "Grace", UserRole::Instructor);
        let (mut collection, id) = seeded_by(&ada());
        let mut coordinator = MutationCoordinator::new(&mut collection, &policy, &instructor);

        assert!(matches!(
            coordinator.remove(id + 1),
            Err(CollectionError::NotFound { .. })
        ));
        assert!(matches!(
            coordinator.update(id + 1, input("x")),
            Err(CollectionError::NotFound { .. })
        ));
        coordinator.remove(id).unwrap();
        assert!(collection.is_empty());
    }
}
