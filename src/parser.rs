//! Schema-dump parser.
//!
//! Parses the textual output of an MDB/Jet schema dump into class-model
//! instances. The format is line-oriented: a `CREATE TABLE [Name]` header,
//! an opening parenthesis, comma-separated `[Column] Type ...` entries, and
//! a `);` terminator. Comment lines start with `#` and are skipped
//! anywhere. Reaching end-of-input before the terminator closes the table
//! with the members read so far; this leniency is deliberate, since dumps
//! are occasionally truncated by hand.

use crate::error::{Failure, GenError};
use crate::model::{squish, Access, Clss, Member};
use crate::types::{ColumnType, FloatPrecision, IntWidth};
use indexmap::IndexMap;

/// Result of parsing one schema text: the classes that parsed, plus every
/// recorded failure. A bad column is scoped to that column; the rest of
/// its table still parses.
#[derive(Debug)]
pub struct ParsedSchema {
    pub classes: Vec<Clss>,
    pub failures: Vec<Failure>,
}

/// Parser for table-definition dumps.
pub struct SchemaParser {
    /// Manual overrides for ambiguous abbreviations the mechanical
    /// word-split gets wrong. Disambiguation data, not logic.
    renames: IndexMap<String, String>,
}

impl Default for SchemaParser {
    fn default() -> Self {
        SchemaParser::new()
    }
}

impl SchemaParser {
    pub fn new() -> SchemaParser {
        let mut renames = IndexMap::new();
        for (from, to) in [
            ("I_R", "ind or real"),
            ("F_P", "f p"),
            ("Mtevent", "mt event"),
            ("MTEVENT", "mt event"),
            ("MTEVENTE", "mt evente"),
            ("DQCODE", "dq code"),
            ("DQDESCRIPT", "dq descript"),
            ("DQCODESecondary", "dq code secondary"),
            ("DQDESCRIPTSecondary", "dq descript secondary"),
            ("RELAYAGE", "relay age"),
        ] {
            renames.insert(from.to_string(), to.to_string());
        }
        SchemaParser { renames }
    }

    /// Replace the override table, e.g. for schemas from another source.
    pub fn with_renames(renames: IndexMap<String, String>) -> SchemaParser {
        SchemaParser { renames }
    }

    /// Parse every table definition in `text`. Each table becomes an
    /// independent class in `package`.
    pub fn parse(&self, text: &str, package: &[String]) -> ParsedSchema {
        let lines: Vec<&str> = text.lines().collect();
        let mut classes = Vec::new();
        let mut failures = Vec::new();

        let mut i = 0;
        while i < lines.len() {
            let line = squish(lines[i]);
            if line.starts_with('#') || !line.contains("CREATE TABLE") {
                i += 1;
                continue;
            }
            match self.parse_table(&lines, i, package, &mut failures) {
                Ok((clss, next)) => {
                    classes.push(clss);
                    i = next;
                }
                Err((err, next)) => {
                    failures.push(Failure::new(None, None, None, &err));
                    i = next;
                }
            }
        }

        ParsedSchema { classes, failures }
    }

    /// Parse the table whose header is at `start`. Returns the class and
    /// the line index to resume scanning at.
    fn parse_table(
        &self,
        lines: &[&str],
        start: usize,
        package: &[String],
        failures: &mut Vec<Failure>,
    ) -> Result<(Clss, usize), (GenError, usize)> {
        let header = squish(lines[start]);
        let table_name = match table_name_of(&header) {
            Some(name) => name,
            None => {
                return Err((
                    GenError::MalformedTable {
                        detail: format!("no bracketed table name in '{}'", header),
                    },
                    start + 1,
                ))
            }
        };

        // Body starts after the '(' that follows the table name, on the
        // header line or a later one.
        let mut body = String::new();
        let mut i = start;
        let after_name = match header.split_once(&format!("[{}]", table_name)) {
            Some((_, rest)) => rest.to_string(),
            None => String::new(),
        };
        let mut opened = false;
        if let Some(pos) = after_name.find('(') {
            opened = true;
            body.push_str(&after_name[pos + 1..]);
            body.push(' ');
        }
        i += 1;
        while !opened && i < lines.len() {
            let line = squish(lines[i]);
            if line.starts_with('#') || line.is_empty() {
                i += 1;
                continue;
            }
            if line.contains("CREATE TABLE") {
                return Err((
                    GenError::MalformedTable {
                        detail: format!("table '{}' has no column list", table_name),
                    },
                    i,
                ));
            }
            match line.find('(') {
                Some(pos) => {
                    opened = true;
                    body.push_str(&line[pos + 1..]);
                    body.push(' ');
                    i += 1;
                }
                None => {
                    return Err((
                        GenError::MalformedTable {
                            detail: format!("table '{}' has no column list", table_name),
                        },
                        i,
                    ))
                }
            }
        }

        // Collect entries until the `);` terminator, tolerating its absence
        // at end-of-input.
        let mut end = i;
        if !terminated(&mut body) {
            while end < lines.len() {
                let line = squish(lines[end]);
                end += 1;
                if line.starts_with('#') {
                    continue;
                }
                if let Some(pos) = line.find(");") {
                    body.push_str(&line[..pos]);
                    break;
                }
                body.push_str(&line);
                body.push(' ');
            }
        }

        let class_name = self
            .renames
            .get(&table_name)
            .cloned()
            .unwrap_or_else(|| table_name.clone());

        let mut members = Vec::new();
        let mut uniques = Vec::new();
        for entry in body.split(',') {
            let entry = squish(entry);
            if entry.is_empty() {
                continue;
            }
            match self.parse_entry(&entry, &table_name) {
                Ok(member) => {
                    if member.unique() {
                        uniques.push(member.column_name().to_string());
                    }
                    members.push(member);
                }
                Err(err) => {
                    let member = match &err {
                        GenError::UnknownTypeKeyword { column, .. } => Some(column.clone()),
                        _ => None,
                    };
                    failures.push(Failure::new(Some(table_name.clone()), member, None, &err));
                }
            }
        }

        let schema_text = lines[start..end.min(lines.len())].join("\n");
        Ok((
            Clss::new(table_name, class_name, members, uniques, package.to_vec(), schema_text),
            end,
        ))
    }

    /// Parse one `[Column] Type ...` entry.
    fn parse_entry(&self, entry: &str, table_name: &str) -> Result<Member, GenError> {
        let malformed = || GenError::MalformedColumn { entry: entry.to_string() };

        let rest = entry.strip_prefix('[').ok_or_else(malformed)?;
        let (column, type_desc) = rest.split_once(']').ok_or_else(malformed)?;
        let column = column.trim();
        let type_desc = type_desc.trim();
        if column.is_empty() || type_desc.is_empty() {
            return Err(malformed());
        }

        let mut required = type_desc.contains("NOT NULL");
        let ty = self.map_type(column, type_desc)?;

        let unique = column.eq_ignore_ascii_case(table_name);
        if unique {
            required = true;
        }

        Ok(Member::new(
            column,
            self.member_name_for(column),
            ty,
            unique,
            Access::Public,
            required,
        ))
    }

    /// Fixed dispatch table from type keyword to semantic type.
    fn map_type(&self, column: &str, type_desc: &str) -> Result<ColumnType, GenError> {
        let words: Vec<&str> = type_desc.split_whitespace().collect();
        let keyword = words[0];
        match keyword {
            "Long" => Ok(ColumnType::integer(IntWidth::W64)),
            "Integer" => Ok(ColumnType::integer(IntWidth::W16)),
            "Byte" => Ok(ColumnType::integer(IntWidth::W8)),
            "Single" => Ok(ColumnType::float(FloatPrecision::Single)),
            "Double" => Ok(ColumnType::float(FloatPrecision::Double)),
            "DateTime" => Ok(ColumnType::DateTime),
            "Boolean" => Ok(ColumnType::Boolean),
            "Currency" => Ok(ColumnType::Currency),
            "Text" => Ok(ColumnType::text(text_length(words.get(1)))),
            _ => Err(GenError::UnknownTypeKeyword {
                column: column.to_string(),
                keyword: keyword.to_string(),
            }),
        }
    }

    /// Derive the normalized member name from a raw column name: the
    /// override table wins; otherwise underscores become spaces, compound
    /// words split at case transitions, parentheses become underscores, and
    /// the result is lowercased with whitespace collapsed.
    pub fn member_name_for(&self, column: &str) -> String {
        if let Some(renamed) = self.renames.get(column) {
            return renamed.clone();
        }
        let spaced = column.replace('_', " ");
        let split = split_mixed_case(&spaced);
        let cleaned = split.replace('(', "_").replace(')', "_");
        squish(&cleaned.to_lowercase())
    }
}

/// Extract the bracketed table name from a `CREATE TABLE` header line.
fn table_name_of(header: &str) -> Option<String> {
    let rest = header.split("CREATE TABLE").nth(1)?;
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('[')?;
    let (name, _) = rest.split_once(']')?;
    Some(name.to_string())
}

/// Split a mixed-case compound word into space-separated words, each
/// uppercase letter starting a new word. Strings without both cases (pure
/// acronyms, plain lowercase) are left as-is.
pub fn split_mixed_case(s: &str) -> String {
    let has_lower = s.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = s.chars().any(|c| c.is_ascii_uppercase());
    if !has_lower || !has_upper {
        return s.to_string();
    }

    let mut words: Vec<String> = Vec::new();
    for c in s.replace('_', " ").chars() {
        if c.is_ascii_uppercase() && !words.is_empty() {
            words.push(c.to_string());
        } else if let Some(last) = words.last_mut() {
            last.push(c);
        } else {
            words.push(c.to_string());
        }
    }
    words.join(" ").to_lowercase()
}

/// Parse the `(n)` length token after `Text`, if present.
fn text_length(token: Option<&&str>) -> Option<u32> {
    let token = token?;
    let digits: String = token.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Check whether the `);` terminator already sits inside collected body
/// text (single-line table form); if so trim the body at it.
fn terminated(body: &mut String) -> bool {
    if let Some(pos) = body.find(");") {
        body.truncate(pos);
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureKind;

    const ATHLETE: &str = "\
CREATE TABLE [Athlete]
 (
\t[Athlete]\t\t\tLong Integer,
\t[Age]\t\t\t\tInteger,
\t[Sex]\t\t\t\tText (2),
\t[Inactive]\t\t\tBoolean NOT NULL
);
";

    #[test]
    fn test_athlete_round_trip() {
        let parser = SchemaParser::new();
        let parsed = parser.parse(ATHLETE, &["db".to_string()]);
        assert!(parsed.failures.is_empty());
        assert_eq!(parsed.classes.len(), 1);

        let clss = &parsed.classes[0];
        assert_eq!(clss.table_name(), "Athlete");
        assert_eq!(clss.class_name(), "Athlete");
        assert_eq!(clss.package(), &["db".to_string()]);

        let members = clss.members();
        assert_eq!(members.len(), 4);

        assert_eq!(members[0].column_name(), "Athlete");
        assert_eq!(members[0].ty(), &ColumnType::integer(IntWidth::W64));
        assert!(members[0].unique());
        assert!(members[0].required());

        assert_eq!(members[1].column_name(), "Age");
        assert_eq!(members[1].ty(), &ColumnType::integer(IntWidth::W16));
        assert!(!members[1].unique());
        assert!(members[1].optional());

        assert_eq!(members[2].ty(), &ColumnType::text(Some(2)));
        assert!(members[2].optional());

        assert_eq!(members[3].ty(), &ColumnType::Boolean);
        assert!(members[3].required());

        assert_eq!(clss.uniques(), &["Athlete".to_string()]);
    }

    #[test]
    fn test_single_line_table() {
        let parser = SchemaParser::new();
        let input = "CREATE TABLE [Athlete] ( [Athlete] Long Integer, [Age] Integer, [Sex] Text (2), [Inactive] Boolean NOT NULL );";
        let parsed = parser.parse(input, &[]);
        assert!(parsed.failures.is_empty());
        assert_eq!(parsed.classes.len(), 1);
        assert_eq!(parsed.classes[0].members().len(), 4);
        assert!(parsed.classes[0].is_keyed());
    }

    #[test]
    fn test_unknown_keyword_scoped_to_column() {
        let parser = SchemaParser::new();
        let input = "\
CREATE TABLE [Meet]
 (
\t[Meet]\tLong Integer,
\t[Fee]\tMoney,
\t[Start]\tDateTime,
\t[Course]\tText (2)
);
";
        let parsed = parser.parse(input, &[]);
        assert_eq!(parsed.classes.len(), 1);
        // The bad column is dropped; the other three survive.
        assert_eq!(parsed.classes[0].members().len(), 3);
        assert_eq!(parsed.failures.len(), 1);
        let failure = &parsed.failures[0];
        assert_eq!(failure.kind, FailureKind::Parse);
        assert_eq!(failure.table.as_deref(), Some("Meet"));
        assert_eq!(failure.member.as_deref(), Some("Fee"));
        assert!(failure.message.contains("Money"));
    }

    #[test]
    fn test_comment_lines_skipped() {
        let parser = SchemaParser::new();
        let input = "\
# dumped 2004-06-01
CREATE TABLE [Team]
 (
# header comment
\t[Team]\tLong Integer,
# trailing comment
\t[Short]\tText (20)
);
";
        let parsed = parser.parse(input, &[]);
        assert!(parsed.failures.is_empty());
        assert_eq!(parsed.classes[0].members().len(), 2);
    }

    #[test]
    fn test_missing_terminator_is_lenient() {
        let parser = SchemaParser::new();
        let input = "\
CREATE TABLE [Team]
 (
\t[Team]\tLong Integer,
\t[Coach]\tText (30),
";
        let parsed = parser.parse(input, &[]);
        assert!(parsed.failures.is_empty());
        assert_eq!(parsed.classes.len(), 1);
        assert_eq!(parsed.classes[0].members().len(), 2);
    }

    #[test]
    fn test_multiple_tables() {
        let parser = SchemaParser::new();
        let input = "\
CREATE TABLE [Team]
 (
\t[Team]\tLong Integer
);
CREATE TABLE [Entry]
 (
\t[Meet]\tLong Integer,
\t[Event]\tInteger
);
";
        let parsed = parser.parse(input, &[]);
        assert_eq!(parsed.classes.len(), 2);
        assert!(parsed.classes[0].is_keyed());
        assert!(!parsed.classes[1].is_keyed());
    }

    #[test]
    fn test_member_name_derivation() {
        let parser = SchemaParser::new();
        assert_eq!(parser.member_name_for("DateClubJoined"), "date club joined");
        assert_eq!(parser.member_name_for("ID_NO"), "id no");
        assert_eq!(parser.member_name_for("Birth"), "birth");
        // Override table entries win over the mechanical split.
        assert_eq!(parser.member_name_for("I_R"), "ind or real");
        assert_eq!(parser.member_name_for("DQCODE"), "dq code");
        // Parenthesized relay columns.
        assert_eq!(parser.member_name_for("ATH(1)"), "ath_1_");
    }

    #[test]
    fn test_split_mixed_case() {
        assert_eq!(split_mixed_case("DateClubJoined"), "date club joined");
        // Consecutive capitals each start a word; the override table exists
        // for names where that reads badly.
        assert_eq!(split_mixed_case("WMGroup"), "w m group");
        // No lowercase letters: left alone.
        assert_eq!(split_mixed_case("MTEVENT"), "MTEVENT");
        assert_eq!(split_mixed_case("age"), "age");
    }

    #[test]
    fn test_renamed_table_class_name() {
        let parser = SchemaParser::new();
        let input = "\
CREATE TABLE [MTEVENT]
 (
\t[MTEVENT]\tLong Integer,
\t[Distance]\tInteger
);
";
        let parsed = parser.parse(input, &[]);
        let clss = &parsed.classes[0];
        assert_eq!(clss.table_name(), "MTEVENT");
        assert_eq!(clss.class_name(), "mt event");
        // Uniqueness keys off the table name, not the renamed class name.
        assert!(clss.members()[0].unique());
    }

    #[test]
    fn test_text_without_length() {
        let parser = SchemaParser::new();
        let input = "CREATE TABLE [Note] ( [Body] Text );";
        let parsed = parser.parse(input, &[]);
        assert_eq!(parsed.classes[0].members()[0].ty(), &ColumnType::text(None));
    }
}
