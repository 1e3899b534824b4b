//! End-to-end checks of the table engine and the calculation pass through
//! the public API.

use std::str::FromStr;
use std::sync::Arc;

use rust_decimal::Decimal;

use epc_core::calculations::ending_balance;
use epc_core::catalog::{self, baseline, baseyear};
use epc_core::cursor::{decode_cursor, encode_cursor};
use epc_core::indoor_clima::{DemandScale, IndoorClima, Pipe, Quality, Zone};
use epc_core::rates::StaticRates;
use epc_core::{Cell, Contract, ContractStore, FileContractStore, ProjectSnapshot, Row, Table};

fn dec(text: &str) -> Decimal {
    Decimal::from_str(text).unwrap()
}

/// Six months of base-year input with the 13 catalog columns.
fn input_data() -> Table {
    let mut table = catalog::baseyear_table(catalog::BASEYEAR_N, 0).empty_clone();
    let months = [
        ("January", "12.3456", "60.5"),
        ("February", "15.1234", "62.1"),
        ("March", "10.0001", "61.0"),
        ("April", "13.5", "63.2"),
        ("May", "11.1188", "60.78"),
        ("December", "13.5", "62.5"),
    ];
    for (month, heat, temperature) in months {
        let mut cells = vec![Cell::default(); table.column_count()];
        cells[0] = Cell::from(month);
        cells[baseyear::HEATING_DAYS] = Cell::from("30");
        cells[baseyear::TOTAL_HEAT] = Cell::from(heat);
        cells[baseyear::DHW_TEMPERATURE] = Cell::from(temperature);
        table.append_row(Row::new(cells)).unwrap();
    }
    table
}

#[test]
fn test_amortization_fixed_point() {
    let mut balance = "5000".to_string();
    for _ in 0..5 {
        balance = ending_balance(&balance, "34.39", "5.5", Decimal::ZERO);
    }
    assert_eq!(balance, "4942.1");
}

#[test]
fn test_amortization_unparseable_balance() {
    let mut balance = "dfd".to_string();
    for _ in 0..5 {
        balance = ending_balance(&balance, "34.39", "5.5", Decimal::ZERO);
    }
    assert_eq!(balance, "0");
}

#[test]
fn test_table_totals_and_averages() {
    let table = input_data();
    assert_eq!(table.column_count(), 13);
    assert_eq!(table.total(baseyear::TOTAL_HEAT).unwrap(), dec("75.5879"));
    assert_eq!(
        table.average(baseyear::DHW_TEMPERATURE).unwrap().round_dp(4),
        dec("61.68")
    );
}

#[test]
fn test_sort_by_month_name() {
    let mut table = input_data();
    table.set_sort_column(0).unwrap();
    table.sort();
    assert_eq!(table.row(0).cell(0).as_str(), "April");
    assert_eq!(table.row(table.row_count() - 1).cell(0).as_str(), "May");
}

#[test]
fn test_domestic_hot_water_lands_in_baseline() {
    let project = ProjectSnapshot::new("Latvia");
    let mut contract = Contract::new(project.id);
    {
        let year = contract.table_mut(catalog::BASEYEAR_N).unwrap();
        year.set_cell(0, baseyear::DHW_VOLUME, Cell::from("60"));
        year.set_cell(1, baseyear::DHW_VOLUME, Cell::from("40"));
        year.set_cell(0, baseyear::DHW_TEMPERATURE, Cell::from("30"));
        year.set_cell(1, baseyear::DHW_TEMPERATURE, Cell::from("30"));
    }

    contract.calculate(&project).unwrap();

    let qku = contract
        .table(catalog::BASELINE)
        .unwrap()
        .cell(baseline::QKU, baseline::FIRST_YEAR)
        .decimal();
    assert_eq!(qku, dec("5813888.89"));
}

#[test]
fn test_cursor_roundtrip() {
    assert_eq!(encode_cursor(42), "Y3Vyc29yOjQy");
    assert_eq!(decode_cursor("Y3Vyc29yOjQy"), 42);
    assert_eq!(decode_cursor("not-base64"), -1);
}

#[test]
fn test_store_then_indoor_clima() {
    let root = tempfile::tempdir().unwrap();
    let rates = StaticRates::new(Decimal::ZERO).with_default_vat(dec("0.2"));
    let store = FileContractStore::new(root.path(), Arc::new(rates), "flow@example.com");

    let project = ProjectSnapshot::new("Poland")
        .with_heated_area(Decimal::from(1200))
        .with_floors(5);
    let mut contract = Contract::new(project.id);
    contract.set_field("client_name", "Housing association");
    store.save(&mut contract, &project).unwrap();

    let loaded = store.load(&project).unwrap();
    assert_eq!(loaded.field("client_name"), "Housing association");
    assert_eq!(loaded.vat, dec("0.2"));

    let mut clima = IndoorClima::new(project.id);
    clima.basement_pipes.push(Pipe::new(Quality::Good, 20.0, 50.0));
    clima.zones.insert("windows_south".to_string(), Zone::new(40.0, 1.2));
    clima.zones.insert("walls".to_string(), Zone::new(800.0, 0.3));
    clima.calculate(&loaded, &project, DemandScale::PerMillion).unwrap();
    store.save_indoor_clima(&clima).unwrap();

    let reloaded = store.load_indoor_clima(project.id).unwrap();
    assert_eq!(reloaded, clima);
    assert_eq!(reloaded.total_window_area, 40.0);
    assert_eq!(reloaded.heat_gains_internal, 7200.0);
}
