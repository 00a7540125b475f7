use tracing::debug;

use crate::aggregation::Valuation;
use crate::book::Book;
use crate::export::{build_table, ExportTable};
use crate::records::{MonthTag, OwnerScope, RecordKind};

use super::{ServiceError, ServiceResult};

pub struct ExportService;

impl ExportService {
    /// Resolves the section and month as typed by a user (`YYYY-MM` or `MM-YYYY`).
    pub fn table(
        book: &Book,
        section: &str,
        month: &str,
        scope: OwnerScope,
        valuation: Valuation,
    ) -> ServiceResult<ExportTable> {
        let kind: RecordKind = section
            .parse()
            .map_err(|_| ServiceError::Invalid(format!("Invalid section `{}`", section.trim())))?;
        let month = MonthTag::parse_lenient(month)?;
        let table = build_table(book, kind, month, scope, valuation)?;
        debug!(
            section = %kind,
            %month,
            ?valuation,
            rows = table.rows.len(),
            "export table built"
        );
        Ok(table)
    }
}
