//! Identifier generation.
//!
//! Ids are `<prefix>-<token>` for single creation and
//! `<prefix>-<token>-<index>` for batch creation, where `token` is an epoch
//! millisecond timestamp. Only uniqueness within one collection is required.

pub const ROW_PREFIX: &str = "row";
pub const COLUMN_PREFIX: &str = "col";

/// Hands out timestamp-based ids that never repeat within one generator,
/// even when several are requested inside the same millisecond.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    last_token: Option<i64>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh id for `prefix` that `is_taken` does not report.
    ///
    /// The token starts at `now_ms` and moves forward past the previously
    /// issued token and past any id already present in the collection.
    pub fn next_id(
        &mut self,
        prefix: &str,
        now_ms: i64,
        is_taken: impl Fn(&str) -> bool,
    ) -> String {
        let mut token = self.next_token(now_ms);
        loop {
            let candidate = format!("{prefix}-{token}");
            if !is_taken(&candidate) {
                self.last_token = Some(token);
                return candidate;
            }
            token += 1;
        }
    }

    /// Reserves one token for a batch; callers append a positional index.
    pub fn batch_token(&mut self, now_ms: i64) -> i64 {
        let token = self.next_token(now_ms);
        self.last_token = Some(token);
        token
    }

    fn next_token(&self, now_ms: i64) -> i64 {
        match self.last_token {
            Some(last) if last >= now_ms => last + 1,
            _ => now_ms,
        }
    }
}

/// Id for the `index`-th entity of a batch created with `token`.
pub fn batch_id(prefix: &str, token: i64, index: usize) -> String {
    format!("{prefix}-{token}-{index}")
}

#[cfg(test)]
mod tests {
    use super::{batch_id, IdGenerator, ROW_PREFIX};

    #[test]
    fn same_millisecond_requests_get_distinct_ids() {
        let mut ids = IdGenerator::new();
        let first = ids.next_id(ROW_PREFIX, 1_000, |_| false);
        let second = ids.next_id(ROW_PREFIX, 1_000, |_| false);
        assert_eq!(first, "row-1000");
        assert_eq!(second, "row-1001");
    }

    #[test]
    fn skips_ids_already_in_collection() {
        let mut ids = IdGenerator::new();
        let taken = ["row-5", "row-6"];
        let id = ids.next_id(ROW_PREFIX, 5, |candidate| taken.contains(&candidate));
        assert_eq!(id, "row-7");
    }

    #[test]
    fn clock_going_backwards_does_not_reuse_tokens() {
        let mut ids = IdGenerator::new();
        assert_eq!(ids.batch_token(50), 50);
        assert_eq!(ids.batch_token(10), 51);
        assert_eq!(batch_id("col", 51, 3), "col-51-3");
    }
}
