//! # Batch Report Export
//!
//! Fixed columns, one row per input identifier, in input order:
//!
//! `Hash, Status, Message, Title, Type, Owner, CertificateType, CreatedAt, BlockchainNetwork`
//!
//! `CreatedAt` is the certificate's `issuedAt`. `BlockchainNetwork` is the
//! network of the anchor record observed during verification, empty when
//! none was observed. Columns a failed item cannot fill are empty.

use rcert_core::{BatchId, Timestamp};
use serde::{Deserialize, Serialize};

use crate::item::{BatchItem, BatchSummary};

/// Header row, in column order.
pub const REPORT_COLUMNS: [&str; 9] = [
    "Hash",
    "Status",
    "Message",
    "Title",
    "Type",
    "Owner",
    "CertificateType",
    "CreatedAt",
    "BlockchainNetwork",
];

/// One exported row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ReportRow {
    pub hash: String,
    pub status: String,
    pub message: String,
    pub title: String,
    #[serde(rename = "Type")]
    pub work_type: String,
    pub owner: String,
    pub certificate_type: String,
    pub created_at: String,
    pub blockchain_network: String,
}

impl ReportRow {
    pub(crate) fn from_item(item: &BatchItem) -> Self {
        let view = item.result.as_ref().and_then(|r| r.certificate.as_ref());
        let network = item
            .result
            .as_ref()
            .and_then(|r| r.anchor.as_ref())
            .map(|a| a.network_name.clone());
        Self {
            hash: item.input.clone(),
            status: item.status.as_str().to_string(),
            message: item.message.clone().unwrap_or_default(),
            title: view.and_then(|v| v.title.clone()).unwrap_or_default(),
            work_type: view.and_then(|v| v.work_type.clone()).unwrap_or_default(),
            owner: view.and_then(|v| v.owner_id.clone()).unwrap_or_default(),
            certificate_type: view
                .map(|v| v.certificate_type.as_str().to_string())
                .unwrap_or_default(),
            created_at: view.map(|v| v.issued_at.to_iso8601()).unwrap_or_default(),
            blockchain_network: network.unwrap_or_default(),
        }
    }

    fn fields(&self) -> [&str; 9] {
        [
            self.hash.as_str(),
            self.status.as_str(),
            self.message.as_str(),
            self.title.as_str(),
            self.work_type.as_str(),
            self.owner.as_str(),
            self.certificate_type.as_str(),
            self.created_at.as_str(),
            self.blockchain_network.as_str(),
        ]
    }
}

/// Terminal export of a fully resolved batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchReport {
    pub batch_id: BatchId,
    pub summary: BatchSummary,
    pub cancelled: bool,
    pub generated_at: Timestamp,
    pub rows: Vec<ReportRow>,
}

impl BatchReport {
    /// RFC 4180 CSV with a header row and CRLF line endings.
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        push_record(&mut out, REPORT_COLUMNS.iter().copied());
        for row in &self.rows {
            push_record(&mut out, row.fields().into_iter());
        }
        out
    }
}

fn push_record<'a>(out: &mut String, fields: impl Iterator<Item = &'a str>) {
    for (i, field) in fields.enumerate() {
        if i > 0 {
            out.push(',');
        }
        push_field(out, field);
    }
    out.push_str("\r\n");
}

fn push_field(out: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(hash: &str, message: &str) -> ReportRow {
        ReportRow {
            hash: hash.into(),
            status: "ERROR".into(),
            message: message.into(),
            title: String::new(),
            work_type: String::new(),
            owner: String::new(),
            certificate_type: String::new(),
            created_at: String::new(),
            blockchain_network: String::new(),
        }
    }

    fn report(rows: Vec<ReportRow>) -> BatchReport {
        BatchReport {
            batch_id: BatchId::new(),
            summary: BatchSummary::new(rows.len()),
            cancelled: false,
            generated_at: Timestamp::now(),
            rows,
        }
    }

    #[test]
    fn header_row_first() {
        let csv = report(vec![]).to_csv();
        assert_eq!(
            csv,
            "Hash,Status,Message,Title,Type,Owner,CertificateType,CreatedAt,BlockchainNetwork\r\n"
        );
    }

    #[test]
    fn fields_are_quoted_when_needed() {
        let csv = report(vec![row("0xAAA", "bad, \"very\" bad")]).to_csv();
        let line = csv.lines().nth(1).unwrap();
        assert_eq!(line, "0xAAA,ERROR,\"bad, \"\"very\"\" bad\",,,,,,");
    }

    #[test]
    fn embedded_newline_is_quoted() {
        let csv = report(vec![row("a\nb", "m")]).to_csv();
        assert!(csv.contains("\"a\nb\",ERROR"));
    }
}
