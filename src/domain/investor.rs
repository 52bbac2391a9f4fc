use std::{collections::HashSet, path::PathBuf};

use serde::{Deserialize, Serialize};

pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestorRecord {
    pub investor: String,
    pub deals: String,
    pub median_amount: String,
    pub chains: Vec<String>,
    pub category: String,
    pub round_type: String,
    pub project_name: String,
}

impl InvestorRecord {
    pub fn chains_joined(&self) -> String {
        match self.chains.is_empty() {
            true => NOT_AVAILABLE.to_string(),
            false => self.chains.join(", "),
        }
    }
}

/// Column order of the structured output. Differs from the extraction order
/// and has to stay this way for existing consumers of the files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorRow {
    #[serde(rename = "Investor")]
    pub investor: String,
    #[serde(rename = "Deals")]
    pub deals: String,
    #[serde(rename = "Median Amount")]
    pub median_amount: String,
    #[serde(rename = "Chains")]
    pub chains: String,
    #[serde(rename = "Top Project Category")]
    pub category: String,
    #[serde(rename = "Top Round Type")]
    pub round_type: String,
    #[serde(rename = "Projects")]
    pub project_name: String,
}

pub const INVESTOR_ROW_HEADERS: [&str; 7] = [
    "Investor",
    "Deals",
    "Median Amount",
    "Chains",
    "Top Project Category",
    "Top Round Type",
    "Projects",
];

impl From<&InvestorRecord> for InvestorRow {
    fn from(record: &InvestorRecord) -> Self {
        InvestorRow {
            investor: record.investor.clone(),
            deals: record.deals.clone(),
            median_amount: record.median_amount.clone(),
            chains: record.chains_joined(),
            category: record.category.clone(),
            round_type: record.round_type.clone(),
            project_name: record.project_name.clone(),
        }
    }
}

/// Parallel field groups sampled from the page in one scroll tick. Groups are
/// queried independently and are assumed to stay index aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractionBatch {
    pub investors: Vec<String>,
    pub deals: Vec<String>,
    pub round_types: Vec<String>,
    pub categories: Vec<String>,
    pub names: Vec<String>,
    pub chains: Vec<Vec<String>>,
    pub amounts: Vec<String>,
}

/// Aligns the batch positionally and emits records for investors not yet in
/// `seen`, in the order they appear. Missing secondary values fall back to
/// `N/A` (or no chains). Blank investor cells are skipped.
pub fn assemble(batch: ExtractionBatch, seen: &mut HashSet<String>) -> Vec<InvestorRecord> {
    let mut deals = batch.deals.into_iter();
    let mut round_types = batch.round_types.into_iter();
    let mut categories = batch.categories.into_iter();
    let mut names = batch.names.into_iter();
    let mut chains = batch.chains.into_iter();
    let mut amounts = batch.amounts.into_iter();

    let or_na = |value: Option<String>| value.unwrap_or_else(|| NOT_AVAILABLE.to_string());

    batch
        .investors
        .into_iter()
        .filter_map(|investor| {
            let record = InvestorRecord {
                deals: or_na(deals.next()),
                median_amount: or_na(amounts.next()),
                chains: chains.next().unwrap_or_default(),
                category: or_na(categories.next()),
                round_type: or_na(round_types.next()),
                project_name: or_na(names.next()),
                investor,
            };

            if record.investor.is_empty() || !seen.insert(record.investor.clone()) {
                return None;
            }
            Some(record)
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    DistanceReached,
    RetriesExhausted,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Success,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResult {
    pub structured_file_path: PathBuf,
    pub human_readable_file_path: PathBuf,
    pub record_count: usize,
    pub status: RunStatus,
    pub stop_reason: StopReason,
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{assemble, ExtractionBatch, InvestorRecord, InvestorRow, RunResult, StopReason};

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn investors(records: &[InvestorRecord]) -> Vec<&str> {
        records.iter().map(|r| r.investor.as_str()).collect()
    }

    #[test]
    fn aligns_fields_by_position() {
        let batch = ExtractionBatch {
            investors: strings(&["a16z", "Paradigm"]),
            deals: strings(&["120+", "85"]),
            round_types: strings(&["Seed", "Series A"]),
            categories: strings(&["DeFi", "Infra"]),
            names: strings(&["Uniswap", "Lido"]),
            chains: vec![strings(&["eth.png", "arb.png"]), vec![]],
            amounts: strings(&["$10m", "$25m"]),
        };
        let mut seen = HashSet::new();

        let records = assemble(batch, &mut seen);

        assert_eq!(
            records[1],
            InvestorRecord {
                investor: "Paradigm".to_string(),
                deals: "85".to_string(),
                median_amount: "$25m".to_string(),
                chains: vec![],
                category: "Infra".to_string(),
                round_type: "Series A".to_string(),
                project_name: "Lido".to_string(),
            }
        );
        assert_eq!(records[0].chains, strings(&["eth.png", "arb.png"]));
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn short_groups_fall_back_to_defaults() {
        let batch = ExtractionBatch {
            investors: strings(&["A", "B", "C"]),
            deals: strings(&["1"]),
            chains: vec![strings(&["x.png"])],
            amounts: strings(&["$1m", "$2m"]),
            ..Default::default()
        };

        let records = assemble(batch, &mut HashSet::new());

        assert_eq!(records.len(), 3);
        assert_eq!(records[1].deals, "N/A");
        assert_eq!(records[1].median_amount, "$2m");
        assert_eq!(records[1].chains, Vec::<String>::new());
        assert_eq!(records[2].median_amount, "N/A");
        assert_eq!(records[2].category, "N/A");
        assert_eq!(records[2].round_type, "N/A");
        assert_eq!(records[2].project_name, "N/A");
    }

    #[test]
    fn first_seen_wins_within_and_across_batches() {
        let mut seen = HashSet::new();
        let first = ExtractionBatch {
            investors: strings(&["A", "B", "A"]),
            deals: strings(&["1", "2", "3"]),
            ..Default::default()
        };
        let second = ExtractionBatch {
            investors: strings(&["B", "C"]),
            deals: strings(&["20", "30"]),
            ..Default::default()
        };

        let first = assemble(first, &mut seen);
        let second = assemble(second, &mut seen);

        assert_eq!(investors(&first), vec!["A", "B"]);
        assert_eq!(first[0].deals, "1");
        assert_eq!(investors(&second), vec!["C"]);
        assert_eq!(second[0].deals, "30");
    }

    #[test]
    fn duplicates_do_not_shift_alignment() {
        let batch = ExtractionBatch {
            investors: strings(&["A", "A", "B"]),
            names: strings(&["p1", "p2", "p3"]),
            ..Default::default()
        };

        let records = assemble(batch, &mut HashSet::new());

        assert_eq!(records[1].investor, "B");
        assert_eq!(records[1].project_name, "p3");
    }

    #[test]
    fn dedup_is_case_and_whitespace_sensitive() {
        let batch = ExtractionBatch {
            investors: strings(&["Coinbase", "coinbase", "Coinbase "]),
            ..Default::default()
        };

        let records = assemble(batch, &mut HashSet::new());

        assert_eq!(investors(&records), vec!["Coinbase", "coinbase", "Coinbase "]);
    }

    #[test]
    fn blank_investor_cells_are_skipped() {
        let batch = ExtractionBatch {
            investors: strings(&["", "A"]),
            deals: strings(&["9", "4"]),
            ..Default::default()
        };

        let records = assemble(batch, &mut HashSet::new());

        assert_eq!(investors(&records), vec!["A"]);
        assert_eq!(records[0].deals, "4");
    }

    #[test]
    fn row_uses_output_column_values() {
        let record = InvestorRecord {
            investor: "A".to_string(),
            deals: "3".to_string(),
            median_amount: "N/A".to_string(),
            chains: vec![],
            category: "DeFi".to_string(),
            round_type: "Seed".to_string(),
            project_name: "P".to_string(),
        };

        let row = InvestorRow::from(&record);

        assert_eq!(row.chains, "N/A");
        assert_eq!(row.round_type, "Seed");
    }

    #[test]
    fn run_result_serializes_for_callers() {
        let result = RunResult {
            structured_file_path: "data/x.csv".into(),
            human_readable_file_path: "data/x.txt".into(),
            record_count: 4,
            status: super::RunStatus::Success,
            stop_reason: StopReason::DistanceReached,
        };

        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["structuredFilePath"], "data/x.csv");
        assert_eq!(json["humanReadableFilePath"], "data/x.txt");
        assert_eq!(json["recordCount"], 4);
        assert_eq!(json["status"], "success");
        assert_eq!(json["stopReason"], "distance_reached");
    }
}
