use analytics::PerformanceRow;
use analyzer::{ConsistentPerformer, RegimeSummary, RoiMatrix};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Row, Table};
use core_types::{Classification, MergedRecord, Metric};
use rust_decimal::Decimal;

/// Placeholder printed for metrics that cannot be computed.
pub const UNDEFINED: &str = "-";

const DECIMALS: u32 = 4;

fn new_table(header: impl Into<Row>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

pub fn fmt_decimal(value: Decimal) -> String {
    value.round_dp(DECIMALS).normalize().to_string()
}

pub fn fmt_metric(value: Option<Decimal>) -> String {
    value.map_or_else(|| UNDEFINED.to_string(), fmt_decimal)
}

fn num(value: Option<Decimal>) -> Cell {
    Cell::new(fmt_metric(value)).set_alignment(CellAlignment::Right)
}

pub fn merged_table(records: &[MergedRecord]) -> Table {
    let mut table = new_table([
        "Account",
        "Trade ID",
        "Timestamp",
        "Date",
        "Closed PnL",
        "Size USD",
        "classification",
    ]);
    for r in records {
        table.add_row(vec![
            Cell::new(&r.account),
            Cell::new(&r.trade_id),
            Cell::new(r.timestamp.format("%d-%m-%Y %H:%M")),
            Cell::new(r.date.format("%d-%m-%Y")),
            num(Some(r.closed_pnl)),
            num(r.size_usd),
            Cell::new(
                r.classification
                    .as_ref()
                    .map_or(UNDEFINED, Classification::as_str),
            ),
        ]);
    }
    table
}

pub fn performance_table(rows: &[PerformanceRow]) -> Table {
    let mut header = vec!["Account".to_string(), "classification".to_string()];
    header.extend(Metric::ALL.iter().map(|m| m.to_string()));

    let mut table = new_table(header);
    for row in rows {
        let mut cells = vec![Cell::new(&row.account), Cell::new(&row.classification)];
        cells.extend(Metric::ALL.iter().map(|m| num(row.metric(*m))));
        table.add_row(cells);
    }
    table
}

/// A chosen subset of metric columns, keyed by account (and optionally regime).
pub fn metric_table(rows: &[&PerformanceRow], columns: &[Metric], with_classification: bool) -> Table {
    let mut header = vec!["Account".to_string()];
    if with_classification {
        header.push("classification".to_string());
    }
    header.extend(columns.iter().map(|m| m.to_string()));

    let mut table = new_table(header);
    for row in rows {
        let mut cells = vec![Cell::new(&row.account)];
        if with_classification {
            cells.push(Cell::new(&row.classification));
        }
        cells.extend(columns.iter().map(|m| num(row.metric(*m))));
        table.add_row(cells);
    }
    table
}

pub fn regime_table(summaries: &[RegimeSummary]) -> Table {
    let mut table = new_table([
        "classification",
        "trades",
        "win_rate",
        "total_pnl",
        "pnl_min",
        "pnl_median",
        "pnl_max",
    ]);
    for s in summaries {
        table.add_row(vec![
            Cell::new(&s.classification),
            Cell::new(s.trade_count).set_alignment(CellAlignment::Right),
            num(Some(s.win_rate)),
            num(Some(s.total_pnl)),
            num(Some(s.pnl_min)),
            num(Some(s.pnl_median)),
            num(Some(s.pnl_max)),
        ]);
    }
    table
}

pub fn roi_matrix_table(matrix: &RoiMatrix) -> Table {
    let mut header = vec!["Account".to_string()];
    header.extend(matrix.classifications().iter().map(|c| c.to_string()));

    let mut table = new_table(header);
    for (account, cells) in matrix.to_grid() {
        let mut line = vec![Cell::new(account)];
        line.extend(cells.into_iter().map(num));
        table.add_row(line);
    }
    table
}

pub fn consistent_table(performers: &[ConsistentPerformer], classifications: &[Classification]) -> Table {
    let mut header = vec!["Account".to_string()];
    header.extend(classifications.iter().map(|c| c.to_string()));

    let mut table = new_table(header);
    for p in performers {
        let mut line = vec![Cell::new(&p.account)];
        line.extend(classifications.iter().map(|c| num(p.roi.get(c).copied())));
        table.add_row(line);
    }
    table
}
