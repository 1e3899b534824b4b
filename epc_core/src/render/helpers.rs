//! # Template Helpers
//!
//! Functions registered on the template environment. The row helpers return
//! LaTeX table lines: cells escaped and joined by ` & `, without the trailing
//! `\\`, so a template writes
//!
//! ```text
//! ((* for r in t.rows *))((( rowfmt(t, r) ))) \\
//! ((* endfor *))
//! ((( total(t) ))) \\
//! ```
//!
//! Synthetic rows put their label in the first `Name` column and `{-}` in
//! every cell that has no meaningful value.
//!
//! ## Example
//!
//! ```rust
//! use epc_core::cell::Kind;
//! use epc_core::render::helpers;
//! use epc_core::table::{Column, Row, Table};
//!
//! let table = Table::from_rows(
//!     vec![Column::new("Item", Kind::Name), Column::new("Cost", Kind::Money)],
//!     vec![Row::from_strs(&["Roof & walls", "1200.456"])],
//! )
//! .unwrap();
//!
//! assert_eq!(helpers::rowfmt(&table, &table.rows()[0]), r"Roof \& walls & 1200.46€");
//! assert_eq!(helpers::total(&table).unwrap(), "Total & 1200.46€");
//! ```

use chrono::NaiveDate;
use minijinja::value::{Rest, ViaDeserialize};
use minijinja::{Environment, Value};
use rust_decimal::Decimal;

use crate::cell::{self, Cell, Kind};
use crate::errors::{EpcError, EpcResult};
use crate::l10n;
use crate::table::{Column, Row, Table};

const SEPARATOR: &str = " & ";
const LINE_END: &str = " \\\\\n";
const EMPTY: &str = "{-}";
const DEFAULT_DATE_FORMAT: &str = "%d.%m.%Y";

/// Escape the LaTeX specials that show up in user data.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' | '%' | '#' | '_' | '$' | '{' | '}' => {
                escaped.push('\\');
                escaped.push(c);
            }
            '\\' => escaped.push_str(r"\textbackslash{}"),
            '~' => escaped.push_str(r"\textasciitilde{}"),
            '^' => escaped.push_str(r"\textasciicircum{}"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn join_cells(cells: impl IntoIterator<Item = String>) -> String {
    cells.into_iter().collect::<Vec<_>>().join(SEPARATOR)
}

/// Header lines followed by the line of column names.
pub fn column(columns: &[Column]) -> String {
    header_lines(columns, |name| escape(name))
}

/// Like [`column`], names rotated for narrow columns.
pub fn column_sideways(columns: &[Column]) -> String {
    header_lines(columns, |name| format!("\\rotatebox{{90}}{{{}}}", escape(name)))
}

fn header_lines(columns: &[Column], name: impl Fn(&str) -> String) -> String {
    let mut lines: Vec<String> = Table::new(columns.to_vec())
        .header_rows()
        .iter()
        .map(|header| join_cells(header.iter().map(|cell| escape(cell.as_str()))))
        .collect();
    lines.push(join_cells(columns.iter().map(|c| name(&c.name))));
    lines.join(LINE_END)
}

/// Cells as stored.
pub fn row(row: &Row) -> String {
    join_cells(row.iter().map(|cell| escape(cell.as_str())))
}

/// Numeric cells with exactly two decimals, text verbatim.
pub fn rowf(table: &Table, row: &Row) -> String {
    join_cells(table.columns().iter().enumerate().map(|(i, column)| {
        let cell = row.cell(i);
        if column.kind.is_number() {
            cell::fixed(cell.decimal(), cell::DISPLAY_PLACES)
        } else {
            escape(cell.as_str())
        }
    }))
}

/// Every cell formatted for its column kind, units included.
pub fn rowfmt(table: &Table, row: &Row) -> String {
    join_cells(
        table
            .columns()
            .iter()
            .enumerate()
            .map(|(i, column)| escape(&row.cell(i).format(column.kind))),
    )
}

/// Build a labelled row; `value` gets each column and its index and returns
/// `None` where the row has nothing to show.
fn synthetic(
    table: &Table,
    label: &str,
    value: impl Fn(usize, &Column) -> EpcResult<Option<Decimal>>,
) -> EpcResult<String> {
    let label_at = table.columns().iter().position(|c| c.kind == Kind::Name);
    let mut cells = Vec::with_capacity(table.column_count());
    for (i, column) in table.columns().iter().enumerate() {
        if Some(i) == label_at {
            cells.push(escape(label));
            continue;
        }
        cells.push(match value(i, column)? {
            Some(amount) => escape(&column.kind.format(amount)),
            None => EMPTY.to_string(),
        });
    }
    Ok(join_cells(cells))
}

fn summed(table: &Table, index: usize, column: &Column) -> EpcResult<Option<Decimal>> {
    if !column.can_sum() {
        return Ok(None);
    }
    let sum = table.total(index)?;
    Ok(Some(cell::round(sum, cell::DISPLAY_PLACES)))
}

/// `sum * factor`, an [`EpcError::InvalidInput`] when it leaves the decimal range.
fn scaled(column: &Column, sum: Decimal, factor: Decimal) -> EpcResult<Decimal> {
    sum.checked_mul(factor)
        .map(|amount| cell::round(amount, cell::DISPLAY_PLACES))
        .ok_or_else(|| EpcError::invalid_input(column.name.clone(), sum.to_string(), "VAT amount overflows"))
}

pub fn average(table: &Table) -> EpcResult<String> {
    synthetic(table, "Average", |i, column| {
        if !column.can_avg() {
            return Ok(None);
        }
        table.average(i).map(Some)
    })
}

pub fn total(table: &Table) -> EpcResult<String> {
    synthetic(table, "Total", |i, column| summed(table, i, column))
}

pub fn total_excl_vat(table: &Table) -> EpcResult<String> {
    synthetic(table, "Total excl. VAT", |i, column| summed(table, i, column))
}

/// VAT amount of every summable column.
pub fn vat(table: &Table, vat: Decimal) -> EpcResult<String> {
    synthetic(table, "VAT", |i, column| {
        summed(table, i, column)?
            .map(|sum| scaled(column, sum, vat))
            .transpose()
    })
}

pub fn total_incl_vat(table: &Table, vat: Decimal) -> EpcResult<String> {
    let factor = Decimal::ONE
        .checked_add(vat)
        .ok_or_else(|| EpcError::invalid_input("vat", vat.to_string(), "VAT rate out of range"))?;
    synthetic(table, "Total incl. VAT", |i, column| {
        summed(table, i, column)?
            .map(|sum| scaled(column, sum, factor))
            .transpose()
    })
}

fn template_error(err: EpcError) -> minijinja::Error {
    minijinja::Error::new(minijinja::ErrorKind::InvalidOperation, err.to_string())
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok().or_else(|| {
        chrono::DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|stamp| stamp.date_naive())
    })
}

/// Reformat a date; input that is not a date comes back unchanged.
pub fn date(raw: &str, format: Option<&str>) -> String {
    match parse_date(raw) {
        Some(day) => day.format(format.unwrap_or(DEFAULT_DATE_FORMAT)).to_string(),
        None => raw.to_string(),
    }
}

/// Whole days from `from` to `to`; 0 if either is not a date.
pub fn days_between(from: &str, to: &str) -> i64 {
    match (parse_date(from), parse_date(to)) {
        (Some(from), Some(to)) => (to - from).num_days(),
        _ => 0,
    }
}

pub fn mul(a: i64, b: i64) -> i64 {
    a.saturating_mul(b)
}

/// Integer division, 0 when dividing by zero.
pub fn div(a: i64, b: i64) -> i64 {
    if b == 0 {
        0
    } else {
        a / b
    }
}

/// One part of an address stored as a JSON object.
pub fn address(json: &str, part: &str) -> String {
    serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(json)
        .ok()
        .and_then(|fields| fields.get(part).cloned())
        .map(|value| match value {
            serde_json::Value::String(text) => text,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        })
        .unwrap_or_default()
}

fn year_word(lang: &str) -> &'static str {
    match lang {
        "pl" => "Rok",
        "ro" => "Anul",
        "au" => "Jahr",
        "lv" => "Gads",
        "bg" => "Година",
        _ => "Year",
    }
}

/// Label of a baseline year: `Year n-1 (2022)` for offset 1 and base year 2023.
pub fn baseyear_label(lang: &str, offset: i64, year: i64) -> String {
    let offset = offset.abs();
    let index = if offset == 0 {
        "n".to_string()
    } else {
        format!("n-{offset}")
    };
    if year > 0 {
        format!("{} {} ({})", year_word(lang), index, year - offset)
    } else {
        format!("{} {}", year_word(lang), index)
    }
}

fn decimal_arg(value: &Value) -> Decimal {
    if value.is_undefined() || value.is_none() {
        return Decimal::ZERO;
    }
    cell::parse_decimal(&value.to_string())
}

/// Register every helper on `env`.
pub fn register(env: &mut Environment<'static>) {
    env.add_function("translate", |lang: String, table: ViaDeserialize<Table>| {
        Value::from_serialize(table.localized(&lang))
    });
    env.add_function("join", |tables: Rest<ViaDeserialize<Table>>| {
        let tables: Vec<Table> = tables.0.into_iter().map(|t| t.0).collect();
        Value::from_serialize(Table::join(&tables))
    });
    env.add_function("column", |columns: ViaDeserialize<Vec<Column>>| column(&columns));
    env.add_function("column_sideways", |columns: ViaDeserialize<Vec<Column>>| {
        column_sideways(&columns)
    });
    env.add_function("row", |r: ViaDeserialize<Row>| row(&r));
    env.add_function("rowf", |t: ViaDeserialize<Table>, r: ViaDeserialize<Row>| rowf(&t, &r));
    env.add_function("rowfmt", |t: ViaDeserialize<Table>, r: ViaDeserialize<Row>| {
        rowfmt(&t, &r)
    });
    env.add_function("average", |t: ViaDeserialize<Table>| average(&t).map_err(template_error));
    env.add_function("total", |t: ViaDeserialize<Table>| total(&t).map_err(template_error));
    env.add_function("total_excl_vat", |t: ViaDeserialize<Table>| {
        total_excl_vat(&t).map_err(template_error)
    });
    env.add_function("vat", |t: ViaDeserialize<Table>, rate: Value| {
        vat(&t, decimal_arg(&rate)).map_err(template_error)
    });
    env.add_function("total_incl_vat", |t: ViaDeserialize<Table>, rate: Value| {
        total_incl_vat(&t, decimal_arg(&rate)).map_err(template_error)
    });
    env.add_function("date", |raw: String, format: Option<String>| date(&raw, format.as_deref()));
    env.add_function("days_between", |from: String, to: String| days_between(&from, &to));
    env.add_function("mul", mul);
    env.add_function("div", div);
    env.add_function("read", |value: Value| {
        if value.is_undefined() || value.is_none() {
            String::new()
        } else {
            value.to_string()
        }
    });
    env.add_function("address", |json: String, part: String| address(&json, &part));
    env.add_function("baseyear_label", |lang: String, offset: i64, year: i64| {
        baseyear_label(&lang, offset, year)
    });
    env.add_function("l10n", |lang: String, text: String| l10n::localize(&text, &lang));
    env.add_filter("escape_tex", |text: String| escape(&text));
    env.add_function("fixed", |value: Value| {
        cell::fixed(decimal_arg(&value), cell::DISPLAY_PLACES)
    });
    env.add_function("cell", |raw: String, kind: ViaDeserialize<Kind>| Cell(raw).format(kind.0));
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    fn costs() -> Table {
        Table::from_rows(
            vec![
                Column::new(l10n::localized(&[("en", "Item"), ("lv", "Pozīcija")]), Kind::Name),
                Column::new("Cost", Kind::Money),
                Column::new("Temp", Kind::Temperature),
                Column::new("Note", Kind::String),
            ],
            vec![
                Row::from_strs(&["Walls", "1000.005", "18", "50% done"]),
                Row::from_strs(&["Roof", "200", "21", "#2"]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a & b_c 10% #1 $5"), r"a \& b\_c 10\% \#1 \$5");
        assert_eq!(escape("plain"), "plain");
    }

    #[test]
    fn test_escape_braces_and_text_symbols() {
        assert_eq!(escape(r"\"), r"\textbackslash{}");
        assert_eq!(escape("{"), r"\{");
        assert_eq!(escape("}"), r"\}");
        assert_eq!(escape("~"), r"\textasciitilde{}");
        assert_eq!(escape("^"), r"\textasciicircum{}");
        assert_eq!(
            escape(r"a\b{c}~^"),
            r"a\textbackslash{}b\{c\}\textasciitilde{}\textasciicircum{}"
        );
    }

    #[test]
    fn test_row_helpers() {
        let table = costs();
        let first = &table.rows()[0];
        assert_eq!(row(first), r"Walls & 1000.005 & 18 & 50\% done");
        assert_eq!(rowf(&table, first), r"Walls & 1000.01 & 18.00 & 50\% done");
        assert_eq!(rowfmt(&table, first), r"Walls & 1000.01€ & 18°C & 50\% done");
    }

    #[test]
    fn test_synthetic_rows() {
        let table = costs();
        assert_eq!(total(&table).unwrap(), "Total & 1200.01€ & {-} & {-}");
        assert_eq!(average(&table).unwrap(), "Average & {-} & 19.5°C & {-}");
        assert_eq!(total_excl_vat(&table).unwrap(), "Total excl. VAT & 1200.01€ & {-} & {-}");
        let rate = Decimal::new(21, 2);
        assert_eq!(vat(&table, rate).unwrap(), "VAT & 252€ & {-} & {-}");
        assert_eq!(
            total_incl_vat(&table, rate).unwrap(),
            "Total incl. VAT & 1452.01€ & {-} & {-}"
        );
    }

    #[test]
    fn test_synthetic_rows_overflow() {
        let max = Decimal::MAX.to_string();
        let table = Table::from_rows(
            vec![Column::new("Item", Kind::Name), Column::new("Cost", Kind::Money)],
            vec![Row::from_strs(&["a", &max]), Row::from_strs(&["b", &max])],
        )
        .unwrap();
        assert!(matches!(total(&table), Err(EpcError::InvalidInput { .. })));

        let single = Table::from_rows(table.columns().to_vec(), vec![Row::from_strs(&["a", &max])]).unwrap();
        assert!(total(&single).is_ok());
        assert!(matches!(vat(&single, Decimal::TWO), Err(EpcError::InvalidInput { .. })));
        assert!(matches!(
            total_incl_vat(&single, Decimal::ONE),
            Err(EpcError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_registered_total_overflow_fails_render() {
        let max = Decimal::MAX.to_string();
        let table = Table::from_rows(
            vec![Column::new("Item", Kind::Name), Column::new("Cost", Kind::Money)],
            vec![Row::from_strs(&["a", &max]), Row::from_strs(&["b", &max])],
        )
        .unwrap();
        let mut env = Environment::new();
        register(&mut env);
        env.add_template("t.tex", "{{ total(t) }}").unwrap();
        let err = env
            .get_template("t.tex")
            .unwrap()
            .render(context! { t => table })
            .unwrap_err();
        assert_eq!(err.kind(), minijinja::ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_column_lines() {
        let columns = vec![
            Column::new("Year", Kind::Name),
            Column::new("Energy", Kind::Energy).with_headers(vec!["Heating".to_string()]),
        ];
        assert_eq!(column(&columns), " & Heating \\\\\nYear & Energy");
        assert_eq!(
            column_sideways(&columns[..1]),
            r"\rotatebox{90}{Year}"
        );
    }

    #[test]
    fn test_dates() {
        assert_eq!(date("2024-03-05", None), "05.03.2024");
        assert_eq!(date("2024-03-05T10:00:00Z", Some("%Y/%m")), "2024/03");
        assert_eq!(date("soon", None), "soon");
        assert_eq!(days_between("2024-02-01", "2024-03-01"), 29);
        assert_eq!(days_between("2024-03-01", "2024-02-01"), -29);
        assert_eq!(days_between("x", "2024-02-01"), 0);
    }

    #[test]
    fn test_misc() {
        assert_eq!(mul(6, 7), 42);
        assert_eq!(div(7, 2), 3);
        assert_eq!(div(7, 0), 0);
        let json = r#"{"street":"Brivibas 1","city":"Riga","postal_code":1010}"#;
        assert_eq!(address(json, "city"), "Riga");
        assert_eq!(address(json, "postal_code"), "1010");
        assert_eq!(address(json, "country"), "");
        assert_eq!(address("not json", "city"), "");
        assert_eq!(baseyear_label("lv", 1, 2023), "Gads n-1 (2022)");
        assert_eq!(baseyear_label("en", 0, 0), "Year n");
    }

    #[test]
    fn test_registered_helpers() {
        let mut env = Environment::new();
        register(&mut env);
        env.add_template(
            "t.tex",
            "{% set t = translate('lv', table) %}{{ column(t.columns) }}|{{ rowfmt(t, t.rows[1]) }}|{{ total_incl_vat(t, vat) }}|{{ l10n('lv', name) }}",
        )
        .unwrap();
        let out = env
            .get_template("t.tex")
            .unwrap()
            .render(context! {
                table => costs(),
                vat => "0.21",
                name => l10n::localized(&[("en", "Month"), ("lv", "Mēnesis")]),
            })
            .unwrap();
        assert_eq!(
            out,
            r"Pozīcija & Cost & Temp & Note|Roof & 200€ & 21°C & \#2|Total incl. VAT & 1452.01€ & {-} & {-}|Mēnesis"
        );
    }

    #[test]
    fn test_join_helper() {
        let mut env = Environment::new();
        register(&mut env);
        let joined = env
            .render_str("{{ join(a, b).columns | length }}", context! { a => costs(), b => costs() })
            .unwrap();
        assert_eq!(joined, "7");
    }
}
