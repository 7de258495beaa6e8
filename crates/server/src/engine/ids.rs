use chrono::Utc;

/// Hands out millisecond-timestamp identifiers that never collide with an
/// identifier already in use: a candidate is bumped past the last issued id
/// and past any id the caller reports as taken. Returns `None` once no free id
/// is left above the last one issued.
#[derive(Clone, Debug, Default)]
pub struct IdGenerator {
    last_issued: i64,
}

impl IdGenerator {
    pub fn seeded<I: IntoIterator<Item = i64>>(existing: I) -> Self {
        Self {
            last_issued: existing.into_iter().max().unwrap_or_default(),
        }
    }

    pub fn next_id<F: Fn(i64) -> bool>(&mut self, is_taken: F) -> Option<i64> {
        let mut candidate = Utc::now()
            .timestamp_millis()
            .max(self.last_issued.checked_add(1)?);
        while is_taken(candidate) {
            candidate = candidate.checked_add(1)?;
        }
        self.last_issued = candidate;
        Some(candidate)
    }
}
