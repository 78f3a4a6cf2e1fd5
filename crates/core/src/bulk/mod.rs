//! Bulk savings import reconciliation.
//!
//! Turns tabular upload rows into validated, fully resolved records before
//! anything touches storage. Resolution runs as an explicit pass over
//! pre-fetched lookup maps and is never interleaved with writes, which is
//! what keeps a failing batch all-or-nothing.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::posting::SavingTypeKind;

/// Errors that fail an entire import batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BulkError {
    /// A required column is missing from the header row.
    #[error("Missing required column '{0}'")]
    MissingColumn(&'static str),

    /// The file contains no processable rows.
    #[error("File contains no valid savings rows")]
    EmptyBatch,

    /// A row references a cooperative number with no matching member.
    #[error("Row {row}: cooperative number \"{number}\" not found")]
    UnknownMember {
        /// 1-indexed spreadsheet row (header is row 1).
        row: usize,
        /// The unresolved cooperative number.
        number: String,
    },

    /// A row references a saving type name with no matching type.
    #[error("Row {row}: saving type \"{name}\" not found")]
    UnknownType {
        /// 1-indexed spreadsheet row (header is row 1).
        row: usize,
        /// The unresolved type name.
        name: String,
    },

    /// A referenced saving type has no mapped ledger account.
    #[error("Saving type \"{type_name}\" has no mapped ledger account")]
    UnmappedAccount {
        /// Name of the unmapped type.
        type_name: String,
    },
}

/// Column indices located from the header row.
///
/// Column order is irrelevant; each field is found by label and tolerates
/// both the human template label and the machine key.
#[derive(Debug, Clone)]
pub struct ColumnMap {
    cooperative_number: usize,
    saving_type: usize,
    amount: usize,
    date: Option<usize>,
    description: Option<usize>,
}

fn find_column(headers: &[String], labels: [&str; 2]) -> Option<usize> {
    headers
        .iter()
        .position(|h| labels.contains(&h.trim()))
}

impl ColumnMap {
    /// Locates the import columns in a header row.
    ///
    /// # Errors
    ///
    /// Returns `BulkError::MissingColumn` when a required column is absent.
    pub fn locate(headers: &[String]) -> Result<Self, BulkError> {
        let cooperative_number =
            find_column(headers, ["Cooperative Number", "cooperative_number"])
                .ok_or(BulkError::MissingColumn("Cooperative Number"))?;
        let saving_type = find_column(headers, ["Saving Type", "saving_type_name"])
            .ok_or(BulkError::MissingColumn("Saving Type"))?;
        let amount = find_column(headers, ["Amount", "amount"])
            .ok_or(BulkError::MissingColumn("Amount"))?;
        let date = find_column(headers, ["Date (YYYY-MM-DD)", "date"]);
        let description = find_column(headers, ["Description", "description"]);

        Ok(Self {
            cooperative_number,
            saving_type,
            amount,
            date,
            description,
        })
    }

    /// Extracts one raw row from a record using the located columns.
    #[must_use]
    pub fn extract(&self, record: &[String]) -> RawRow {
        let cell = |idx: Option<usize>| -> String {
            idx.and_then(|i| record.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_default()
        };

        RawRow {
            cooperative_number: cell(Some(self.cooperative_number)),
            saving_type: cell(Some(self.saving_type)),
            amount: cell(Some(self.amount)),
            date: cell(self.date),
            description: cell(self.description),
        }
    }
}

/// One unresolved row as read from the upload.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    /// Member's cooperative number.
    pub cooperative_number: String,
    /// Saving type name.
    pub saving_type: String,
    /// Amount as written in the file.
    pub amount: String,
    /// Date as written in the file.
    pub date: String,
    /// Free-text description.
    pub description: String,
}

/// Saving type lookup data for reconciliation.
#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    /// Saving type id.
    pub id: Uuid,
    /// Mapped ledger account, if configured.
    pub account_id: Option<Uuid>,
    /// Posting direction of the type.
    pub kind: SavingTypeKind,
}

/// One fully resolved row, ready for insertion and posting.
#[derive(Debug, Clone)]
pub struct ResolvedRow {
    /// Resolved member id.
    pub member_id: Uuid,
    /// Resolved saving type id.
    pub saving_type_id: Uuid,
    /// The type's mapped ledger account.
    pub account_id: Uuid,
    /// Posting direction of the type.
    pub kind: SavingTypeKind,
    /// Parsed positive amount.
    pub amount: Decimal,
    /// Entry date (today when absent or unparsable).
    pub date: NaiveDate,
    /// Description, if any.
    pub description: Option<String>,
}

/// Reconciles raw rows against member and type lookup maps.
///
/// Rows without a cooperative number or a positive numeric amount are
/// silently skipped. The first unresolvable reference fails the whole
/// batch; partial success is not allowed.
///
/// # Errors
///
/// Returns `BulkError` naming the offending row/entity, or `EmptyBatch`
/// when nothing remains after skipping.
pub fn reconcile(
    rows: &[RawRow],
    members: &HashMap<String, Uuid>,
    types: &HashMap<String, TypeInfo>,
    today: NaiveDate,
) -> Result<Vec<ResolvedRow>, BulkError> {
    let mut resolved = Vec::with_capacity(rows.len());

    for (index, raw) in rows.iter().enumerate() {
        // Header is spreadsheet row 1; data starts at row 2.
        let row = index + 2;

        if raw.cooperative_number.is_empty() {
            continue;
        }
        let Some(amount) = parse_amount(&raw.amount) else {
            continue;
        };

        let member_id =
            *members
                .get(&raw.cooperative_number)
                .ok_or_else(|| BulkError::UnknownMember {
                    row,
                    number: raw.cooperative_number.clone(),
                })?;

        let info = types
            .get(&raw.saving_type)
            .ok_or_else(|| BulkError::UnknownType {
                row,
                name: raw.saving_type.clone(),
            })?;

        let account_id = info.account_id.ok_or_else(|| BulkError::UnmappedAccount {
            type_name: raw.saving_type.clone(),
        })?;

        let date = NaiveDate::parse_from_str(&raw.date, "%Y-%m-%d").unwrap_or(today);

        resolved.push(ResolvedRow {
            member_id,
            saving_type_id: info.id,
            account_id,
            kind: info.kind,
            amount,
            date,
            description: (!raw.description.is_empty()).then(|| raw.description.clone()),
        });
    }

    if resolved.is_empty() {
        return Err(BulkError::EmptyBatch);
    }

    Ok(resolved)
}

fn parse_amount(raw: &str) -> Option<Decimal> {
    let amount = Decimal::from_str(raw).ok()?;
    (amount > Decimal::ZERO).then_some(amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn headers(labels: &[&str]) -> Vec<String> {
        labels.iter().map(ToString::to_string).collect()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    fn row(number: &str, type_name: &str, amount: &str) -> RawRow {
        RawRow {
            cooperative_number: number.to_string(),
            saving_type: type_name.to_string(),
            amount: amount.to_string(),
            ..RawRow::default()
        }
    }

    fn lookups() -> (HashMap<String, Uuid>, HashMap<String, TypeInfo>) {
        let mut members = HashMap::new();
        members.insert("KOP-001".to_string(), Uuid::new_v4());
        members.insert("KOP-002".to_string(), Uuid::new_v4());

        let mut types = HashMap::new();
        types.insert(
            "Mandatory Saving".to_string(),
            TypeInfo {
                id: Uuid::new_v4(),
                account_id: Some(Uuid::new_v4()),
                kind: SavingTypeKind::Deposit,
            },
        );
        (members, types)
    }

    #[rstest]
    #[case(&["Cooperative Number", "Saving Type", "Amount", "Date (YYYY-MM-DD)", "Description"])]
    #[case(&["cooperative_number", "saving_type_name", "amount", "date", "description"])]
    #[case(&["Amount", "Description", "Saving Type", "date", "Cooperative Number"])]
    fn test_locate_tolerates_spellings_and_order(#[case] labels: &[&str]) {
        assert!(ColumnMap::locate(&headers(labels)).is_ok());
    }

    #[test]
    fn test_locate_missing_required_column() {
        let result = ColumnMap::locate(&headers(&["Cooperative Number", "Amount"]));
        assert_eq!(result.unwrap_err(), BulkError::MissingColumn("Saving Type"));
    }

    #[test]
    fn test_extract_by_located_index() {
        let map = ColumnMap::locate(&headers(&[
            "Amount",
            "Cooperative Number",
            "Saving Type",
        ]))
        .unwrap();

        let record = vec![
            " 150000 ".to_string(),
            "KOP-001".to_string(),
            "Mandatory Saving".to_string(),
        ];
        let raw = map.extract(&record);

        assert_eq!(raw.cooperative_number, "KOP-001");
        assert_eq!(raw.saving_type, "Mandatory Saving");
        assert_eq!(raw.amount, "150000");
        assert_eq!(raw.date, "");
    }

    #[test]
    fn test_reconcile_resolves_valid_rows() {
        let (members, types) = lookups();
        let rows = vec![
            row("KOP-001", "Mandatory Saving", "100000"),
            row("KOP-002", "Mandatory Saving", "250000.50"),
        ];

        let resolved = reconcile(&rows, &members, &types, today()).unwrap();

        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].member_id, members["KOP-001"]);
        assert_eq!(resolved[1].amount, dec!(250000.50));
        assert_eq!(resolved[0].date, today());
    }

    #[rstest]
    #[case("")]
    #[case("0")]
    #[case("-500")]
    #[case("abc")]
    fn test_rows_without_positive_amount_skipped(#[case] amount: &str) {
        let (members, types) = lookups();
        let rows = vec![
            row("KOP-001", "Mandatory Saving", amount),
            row("KOP-002", "Mandatory Saving", "1000"),
        ];

        let resolved = reconcile(&rows, &members, &types, today()).unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].member_id, members["KOP-002"]);
    }

    #[test]
    fn test_amountless_row_skipped_before_resolution() {
        // A row with no amount never reaches member resolution, even when
        // the member is unknown.
        let (members, types) = lookups();
        let rows = vec![
            row("ZZZZ", "Mandatory Saving", ""),
            row("KOP-001", "Mandatory Saving", "1000"),
        ];

        let resolved = reconcile(&rows, &members, &types, today()).unwrap();
        assert_eq!(resolved.len(), 1);
    }

    #[test]
    fn test_unknown_member_fails_batch() {
        let (members, types) = lookups();
        let rows = vec![
            row("KOP-001", "Mandatory Saving", "1000"),
            row("ZZZZ", "Mandatory Saving", "2000"),
        ];

        let err = reconcile(&rows, &members, &types, today()).unwrap_err();
        assert_eq!(
            err,
            BulkError::UnknownMember {
                row: 3,
                number: "ZZZZ".to_string()
            }
        );
        assert!(err.to_string().contains("ZZZZ"));
    }

    #[test]
    fn test_unknown_type_fails_batch() {
        let (members, types) = lookups();
        let rows = vec![row("KOP-001", "Holiday Saving", "1000")];

        let err = reconcile(&rows, &members, &types, today()).unwrap_err();
        assert_eq!(
            err,
            BulkError::UnknownType {
                row: 2,
                name: "Holiday Saving".to_string()
            }
        );
    }

    #[test]
    fn test_unmapped_type_fails_batch() {
        let (members, mut types) = lookups();
        types.insert(
            "Unmapped Saving".to_string(),
            TypeInfo {
                id: Uuid::new_v4(),
                account_id: None,
                kind: SavingTypeKind::Deposit,
            },
        );
        let rows = vec![row("KOP-001", "Unmapped Saving", "1000")];

        let err = reconcile(&rows, &members, &types, today()).unwrap_err();
        assert_eq!(
            err,
            BulkError::UnmappedAccount {
                type_name: "Unmapped Saving".to_string()
            }
        );
    }

    #[test]
    fn test_date_parsing_defaults_to_today() {
        let (members, types) = lookups();
        let mut dated = row("KOP-001", "Mandatory Saving", "1000");
        dated.date = "2026-07-01".to_string();
        let mut garbled = row("KOP-002", "Mandatory Saving", "1000");
        garbled.date = "01/07/2026".to_string();

        let resolved = reconcile(&[dated, garbled], &members, &types, today()).unwrap();
        assert_eq!(resolved[0].date, NaiveDate::from_ymd_opt(2026, 7, 1).unwrap());
        assert_eq!(resolved[1].date, today());
    }

    #[test]
    fn test_empty_batch_is_an_error() {
        let (members, types) = lookups();
        let rows = vec![row("", "Mandatory Saving", "1000")];

        assert_eq!(
            reconcile(&rows, &members, &types, today()).unwrap_err(),
            BulkError::EmptyBatch
        );
    }
}
