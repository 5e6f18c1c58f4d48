//! Statement classification.

/// How a statement's result is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    /// Returns rows: `SELECT`, `SHOW` and `DESCRIBE`.
    Read,
    /// Anything else. Runs in a transaction and reports affected rows.
    Mutation,
}

const READ_PREFIXES: [&str; 3] = ["SELECT", "SHOW", "DESCRIBE"];

impl StatementKind {
    /// Classify by the first keyword after trimming whitespace.
    ///
    /// This is a prefix check, not a parse. Leading comments, `WITH` and
    /// `EXPLAIN` all classify as [`StatementKind::Mutation`].
    pub fn classify(sql: &str) -> Self {
        let head = sql.trim_start();
        let is_read = READ_PREFIXES.iter().any(|prefix| {
            head.len() >= prefix.len()
                && head.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
        });

        if is_read {
            StatementKind::Read
        } else {
            StatementKind::Mutation
        }
    }

    pub fn is_read(self) -> bool {
        matches!(self, StatementKind::Read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_prefixes() {
        assert_eq!(StatementKind::classify("SELECT 1"), StatementKind::Read);
        assert_eq!(StatementKind::classify("  show tables"), StatementKind::Read);
        assert_eq!(StatementKind::classify("\n\tDescribe inventory"), StatementKind::Read);
        assert_eq!(StatementKind::classify("select\n*\nfrom t"), StatementKind::Read);
    }

    #[test]
    fn test_mutations() {
        assert_eq!(
            StatementKind::classify("UPDATE t SET a = 1"),
            StatementKind::Mutation
        );
        assert_eq!(StatementKind::classify("insert into t values (1)"), StatementKind::Mutation);
        assert_eq!(StatementKind::classify("DROP TABLE t"), StatementKind::Mutation);
        assert_eq!(StatementKind::classify(""), StatementKind::Mutation);
        assert_eq!(StatementKind::classify("SEL"), StatementKind::Mutation);
    }

    #[test]
    fn test_prefix_check_is_not_a_parser() {
        assert_eq!(
            StatementKind::classify("  -- comment\nSELECT 1"),
            StatementKind::Mutation
        );
        assert_eq!(
            StatementKind::classify("WITH x AS (SELECT 1) SELECT * FROM x"),
            StatementKind::Mutation
        );
        // A prefix match is enough.
        assert_eq!(StatementKind::classify("SELECTED"), StatementKind::Read);
    }

    #[test]
    fn test_non_ascii_input() {
        assert_eq!(StatementKind::classify("é"), StatementKind::Mutation);
        assert_eq!(StatementKind::classify("ÉÉÉÉÉÉ"), StatementKind::Mutation);
    }
}
