//! # Table Catalog
//!
//! The fixed set of named tables every contract carries. Each table has a
//! localized column layout and a seed row skeleton; the calculation engine
//! in [`crate::calculations`] relies on the column positions documented on
//! the layout functions below.
//!
//! The catalog is built once per process and cloned into each new contract.
//! A table whose seed rows disagree with its columns is a bug in this file,
//! so construction panics instead of returning an error.
//!
//! ## Example
//!
//! ```rust
//! use epc_core::catalog::{self, BASELINE, BASEYEAR_N};
//!
//! let tables = catalog::new_catalog();
//! assert_eq!(tables[BASEYEAR_N].row_count(), 12);
//! assert_eq!(tables[BASELINE].row(0).cell(0).as_str().contains("QT"), true);
//! ```

use std::collections::BTreeMap;

use once_cell::sync::Lazy;

use crate::cell::Kind;
use crate::l10n::{everywhere, localized};
use crate::table::{Column, Row, Table};

pub const BASELINE: &str = "baseline";
pub const BASEYEAR_N: &str = "baseyear_n";
pub const BASEYEAR_N_1: &str = "baseyear_n_1";
pub const BASEYEAR_N_2: &str = "baseyear_n_2";
pub const BASECONDITIONS_N: &str = "baseconditions_n";
pub const BASECONDITIONS_N_1: &str = "baseconditions_n_1";
pub const BASECONDITIONS_N_2: &str = "baseconditions_n_2";
pub const SUMMARY: &str = "summary";
pub const BALANCING_PERIOD_FEE: &str = "balancing_period_fee";
pub const CALC_ENERGY_FEE: &str = "calc_energy_fee";
pub const OPERATION_MAINTENANCE_BUDGET: &str = "operation_maintenance_budget";
pub const OPERATIONS_MAINTENANCE_FEE: &str = "operations_maintenance_fee";
pub const RENOVATION_OVERALL_BUDGET: &str = "renovation_overall_budget";
pub const RENOVATION_FINANCIAL_PLAN: &str = "renovation_financial_plan";
pub const FINANCIAL_CHARGES: &str = "financial_charges";
pub const PROJECT_DEVELOPMENT_RENOVATIONS: &str = "project_development_renovations";
pub const CONSTRUCTION_COSTS_RENOVATIONS: &str = "construction_costs_renovations";
pub const PROJECT_SUPERVISION: &str = "project_supervision";
pub const PROJECT_MEASUREMENTS_TABLE: &str = "project_measurements_table";
pub const MONITORING_PHASE_TABLE: &str = "monitoring_phase_table";
pub const PERIODIC_MAINT_ACTIVITIES: &str = "periodic_maint_activities_covered_by_contractor";
pub const MID_TERM_PREVENTATIVE_ACTIVITY: &str = "mid_term_preventative_activity";
pub const LONG_TERM_PROVISIONED_ACTIVITIES: &str = "long_term_provisioned_activities";
pub const RECOMMENDED_MAINTENANCE_ACTIVITY: &str = "reccomended_maintanance_activity";
pub const MAINTENANCE_LOG: &str = "maitenance_log";
pub const WORK_PHASE_SCOPE_RENOVATION: &str = "workPhase_scope_renovation";

/// Base-year tables, current year first.
pub const BASEYEARS: [&str; 3] = [BASEYEAR_N, BASEYEAR_N_1, BASEYEAR_N_2];

/// Base-condition tables, current year first.
pub const BASECONDITIONS: [&str; 3] = [BASECONDITIONS_N, BASECONDITIONS_N_1, BASECONDITIONS_N_2];

/// Rows in the amortization and monitoring tables (20 years of months).
pub const SCHEDULE_MONTHS: usize = 240;

/// Baseline row indices.
pub mod baseline {
    pub const QT: usize = 0;
    pub const QAPK: usize = 1;
    pub const QCZ: usize = 2;
    pub const QKU: usize = 3;
    pub const QAPKCZ: usize = 4;
    pub const T1: usize = 5;
    pub const GDD: usize = 6;

    /// First year column (year n); n−1 and n−2 follow.
    pub const FIRST_YEAR: usize = 3;
    /// Reference column, right after the three years.
    pub const REFERENCE: usize = 6;
}

/// Base-year column indices.
pub mod baseyear {
    pub const HEATING_DAYS: usize = 1;
    pub const TOTAL_HEAT: usize = 2;
    pub const DHW_VOLUME: usize = 3;
    pub const DHW_TEMPERATURE: usize = 4;
}

/// Base-condition column indices.
pub mod baseconditions {
    pub const HEATING_DAYS: usize = 1;
    pub const OUTDOOR: usize = 2;
    pub const INDOOR: usize = 3;
    pub const GDD: usize = 4;
}

/// Summary row indices.
pub mod summary {
    pub const ENERGY_FEE: usize = 0;
    pub const RENOVATION_FEE: usize = 1;
    pub const OPERATION_FEE: usize = 2;
}

/// Amortization schedule column indices.
pub mod schedule {
    pub const NUMBER: usize = 0;
    pub const DATE: usize = 1;
    pub const BEGINNING_BALANCE: usize = 2;
    pub const PAYMENT: usize = 3;
    pub const ENDING_BALANCE: usize = 4;
}

static CATALOG: Lazy<BTreeMap<String, Table>> = Lazy::new(build);

/// A fresh copy of every catalog table, keyed by name.
pub fn new_catalog() -> BTreeMap<String, Table> {
    CATALOG.clone()
}

/// Names of all catalog tables.
pub fn table_names() -> impl Iterator<Item = &'static str> {
    CATALOG.keys().map(String::as_str)
}

fn build() -> BTreeMap<String, Table> {
    let mut tables = BTreeMap::new();
    let mut add = |name: &str, table: Table| {
        tables.insert(name.to_string(), table);
    };

    for (name, offset) in BASEYEARS.iter().zip(0..) {
        add(name, baseyear_table(name, offset));
    }
    for (name, offset) in BASECONDITIONS.iter().zip(0..) {
        add(name, baseconditions_table(name, offset));
    }
    add(BASELINE, baseline_table());
    add(SUMMARY, summary_table());
    add(BALANCING_PERIOD_FEE, balancing_period_fee_table());
    add(CALC_ENERGY_FEE, calc_energy_fee_table());
    add(OPERATION_MAINTENANCE_BUDGET, operation_maintenance_budget_table());
    add(OPERATIONS_MAINTENANCE_FEE, operations_maintenance_fee_table());
    add(RENOVATION_OVERALL_BUDGET, renovation_overall_budget_table());
    add(RENOVATION_FINANCIAL_PLAN, renovation_financial_plan_table());
    add(PROJECT_DEVELOPMENT_RENOVATIONS, project_development_table());
    add(CONSTRUCTION_COSTS_RENOVATIONS, construction_costs_table());
    add(PROJECT_SUPERVISION, project_supervision_table());
    add(FINANCIAL_CHARGES, financial_charges_table());
    add(PROJECT_MEASUREMENTS_TABLE, project_measurements_table());
    add(MONITORING_PHASE_TABLE, monitoring_phase_table());
    add(PERIODIC_MAINT_ACTIVITIES, periodic_maintenance_table());
    add(MID_TERM_PREVENTATIVE_ACTIVITY, mid_term_preventative_table());
    add(LONG_TERM_PROVISIONED_ACTIVITIES, long_term_provisioned_table());
    add(RECOMMENDED_MAINTENANCE_ACTIVITY, recommended_maintenance_table());
    add(MAINTENANCE_LOG, maintenance_log_table());
    add(WORK_PHASE_SCOPE_RENOVATION, work_phase_scope_table());

    tables
}

// ============================================================================
// Construction helpers
// ============================================================================

/// Localized text in catalog language order: en, pl, ro, au, lv, bg.
fn tr(en: &str, pl: &str, ro: &str, au: &str, lv: &str, bg: &str) -> String {
    localized(&[
        ("en", en),
        ("pl", pl),
        ("ro", ro),
        ("au", au),
        ("lv", lv),
        ("bg", bg),
    ])
}

fn col(name: String, kind: Kind) -> Column {
    Column::new(name, kind)
}

/// Build a catalog table; a malformed definition aborts initialization.
fn table(name: &str, title: String, columns: Vec<Column>, rows: Vec<Row>) -> Table {
    Table::from_rows(columns, rows)
        .unwrap_or_else(|err| panic!("catalog table '{name}' is malformed: {err}"))
        .with_title(title)
}

/// Seed row: `label` in the name column, "0" in numeric columns, empty text.
fn seed(columns: &[Column], label: String) -> Row {
    let cells = columns
        .iter()
        .enumerate()
        .map(|(i, column)| {
            if i == 0 {
                label.clone()
            } else if column.kind.is_number() {
                "0".to_string()
            } else {
                String::new()
            }
        })
        .collect::<Vec<_>>();
    Row::new(cells.into_iter().map(Into::into).collect())
}

fn seeds(columns: &[Column], labels: Vec<String>) -> Vec<Row> {
    labels.into_iter().map(|label| seed(columns, label)).collect()
}

fn months() -> Vec<String> {
    vec![
        tr("January", "Styczeń", "Ianuarie", "Jänner", "Janvāris", "Януари"),
        tr("February", "Luty", "Februarie", "Februar", "Februāris", "Февруари"),
        tr("March", "Marzec", "Martie", "März", "Marts", "Март"),
        tr("April", "Kwiecień", "Aprilie", "April", "Aprīlis", "Април"),
        tr("May", "Maj", "Mai", "Mai", "Maijs", "Май"),
        tr("June", "Czerwiec", "Iunie", "Juni", "Jūnijs", "Юни"),
        tr("July", "Lipiec", "Iulie", "Juli", "Jūlijs", "Юли"),
        tr("August", "Sierpień", "August", "August", "Augusts", "Август"),
        tr("September", "Wrzesień", "Septembrie", "September", "Septembris", "Септември"),
        tr("October", "Październik", "Octombrie", "Oktober", "Oktobris", "Октомври"),
        tr("November", "Listopad", "Noiembrie", "November", "Novembris", "Ноември"),
        tr("December", "Grudzień", "Decembrie", "Dezember", "Decembris", "Декември"),
    ]
}

fn month_column() -> Column {
    col(tr("Month", "Miesiąc", "Luna", "Monat", "Mēnesis", "Месец"), Kind::Name)
}

fn heating_days_column() -> Column {
    col(
        tr("Heating days", "Dni grzewcze", "Zile de încălzire", "Heiztage", "Apkures dienas", "Отоплителни дни"),
        Kind::Count,
    )
}

fn year_title(offset: usize) -> String {
    let index = match offset {
        0 => "n".to_string(),
        n => format!("n-{n}"),
    };
    let words = [
        ("en", "Year"),
        ("pl", "Rok"),
        ("ro", "Anul"),
        ("au", "Jahr"),
        ("lv", "Gads"),
        ("bg", "Година"),
    ];
    let titles: Vec<(&str, String)> = words
        .iter()
        .map(|(lang, word)| (*lang, format!("{word} {index}")))
        .collect();
    let pairs: Vec<(&str, &str)> = titles.iter().map(|(lang, title)| (*lang, title.as_str())).collect();
    localized(&pairs)
}

// ============================================================================
// Baseline tables
// ============================================================================

/// Monthly consumption for one base year.
///
/// Columns: 0 month, 1 heating days, 2 total heat energy consumption,
/// 3 DHW volume `V`, 4 DHW temperature `Oku`, 5 space heating,
/// 6 circulation losses, 7 DHW energy, 8 indoor temperature,
/// 9 outdoor temperature, 10 electricity, 11 heat cost, 12 notes.
pub fn baseyear_table(name: &str, offset: usize) -> Table {
    let heat = tr("Heat energy", "Energia cieplna", "Energie termică", "Wärmeenergie", "Siltumenerģija", "Топлинна енергия");
    let dhw = tr("Domestic hot water", "Ciepła woda użytkowa", "Apă caldă menajeră", "Warmwasser", "Karstais ūdens", "Битова гореща вода");
    let columns = vec![
        month_column(),
        heating_days_column(),
        col(
            tr("Total heat energy consumption", "Całkowite zużycie energii cieplnej", "Consum total de energie termică", "Gesamtwärmeverbrauch", "Kopējais siltumenerģijas patēriņš", "Общо потребление на топлинна енергия"),
            Kind::Energy,
        )
        .with_headers(vec![heat.clone()]),
        col(tr("Consumption V", "Zużycie V", "Consum V", "Verbrauch V", "Patēriņš V", "Потребление V"), Kind::Volume)
            .with_headers(vec![dhw.clone()]),
        col(tr("Temperature Oku", "Temperatura Oku", "Temperatura Oku", "Temperatur Oku", "Temperatūra Oku", "Температура Oku"), Kind::Temperature)
            .with_headers(vec![dhw]),
        col(tr("Space heating", "Ogrzewanie", "Încălzire", "Raumheizung", "Apkure", "Отопление"), Kind::Energy)
            .with_headers(vec![heat.clone()]),
        col(tr("Circulation losses", "Straty cyrkulacji", "Pierderi de circulație", "Zirkulationsverluste", "Cirkulācijas zudumi", "Циркулационни загуби"), Kind::Energy)
            .with_headers(vec![heat.clone()]),
        col(tr("Hot water energy", "Energia c.w.u.", "Energie apă caldă", "Warmwasserenergie", "Karstā ūdens enerģija", "Енергия за гореща вода"), Kind::Energy)
            .with_headers(vec![heat]),
        col(tr("Indoor temperature", "Temperatura wewnętrzna", "Temperatura interioară", "Innentemperatur", "Iekštelpu temperatūra", "Вътрешна температура"), Kind::Temperature),
        col(tr("Outdoor temperature", "Temperatura zewnętrzna", "Temperatura exterioară", "Außentemperatur", "Āra temperatūra", "Външна температура"), Kind::Temperature),
        col(tr("Electricity", "Energia elektryczna", "Energie electrică", "Strom", "Elektroenerģija", "Електроенергия"), Kind::Energy),
        col(tr("Heat cost", "Koszt ciepła", "Cost căldură", "Wärmekosten", "Siltuma izmaksas", "Разходи за топлина"), Kind::Money),
        col(tr("Notes", "Uwagi", "Observații", "Anmerkungen", "Piezīmes", "Бележки"), Kind::String),
    ];
    let rows = seeds(&columns, months());
    table(name, year_title(offset), columns, rows)
}

/// Heating conditions for one base year.
///
/// Columns: 0 month, 1 heating days, 2 outdoor temperature `T1`,
/// 3 indoor temperature `T3`, 4 degree days.
pub fn baseconditions_table(name: &str, offset: usize) -> Table {
    let columns = vec![
        month_column(),
        heating_days_column(),
        col(tr("Outdoor temperature T1", "Temperatura zewnętrzna T1", "Temperatura exterioară T1", "Außentemperatur T1", "Āra temperatūra T1", "Външна температура T1"), Kind::Temperature),
        col(tr("Indoor temperature T3", "Temperatura wewnętrzna T3", "Temperatura interioară T3", "Innentemperatur T3", "Iekštelpu temperatūra T3", "Вътрешна температура T3"), Kind::Temperature),
        col(tr("Degree days", "Stopniodni", "Grade-zile", "Heizgradtage", "Grādu dienas", "Денградуси"), Kind::Decimal),
    ];
    let rows = seeds(&columns, months());
    table(name, year_title(offset), columns, rows)
}

/// Baseline summary of the three base years.
///
/// Rows: QT, QApk, QCz, QKu, QApkCz, T1, GDD. Columns: 0 symbol,
/// 1 description, 2 unit, 3 year n, 4 year n−1, 5 year n−2, 6 reference.
fn baseline_table() -> Table {
    let year = |label: &str| col(everywhere(label), Kind::Decimal);
    let columns = vec![
        col(tr("Symbol", "Symbol", "Simbol", "Symbol", "Simbols", "Символ"), Kind::Name),
        col(tr("Description", "Opis", "Descriere", "Beschreibung", "Apraksts", "Описание"), Kind::String),
        col(tr("Unit", "Jednostka", "Unitate", "Einheit", "Mērvienība", "Мерна единица"), Kind::String),
        year("n"),
        year("n-1"),
        year("n-2"),
        col(tr("Reference", "Referencja", "Referință", "Referenz", "Atsauce", "Референтна"), Kind::Decimal),
    ];
    let line = |symbol: &str, description: String, unit: &str| {
        Row::from_strs(&[symbol, &description, unit, "0", "0", "0", "0"])
    };
    let rows = vec![
        line("QT", tr("Total heat energy consumption", "Całkowite zużycie ciepła", "Consum total de căldură", "Gesamtwärmeverbrauch", "Kopējais siltumenerģijas patēriņš", "Общо потребление на топлина"), "MWh"),
        line("QApk", tr("Space heating", "Ogrzewanie", "Încălzire", "Raumheizung", "Apkure", "Отопление"), "MWh"),
        line("QCz", tr("Circulation losses", "Straty cyrkulacji", "Pierderi de circulație", "Zirkulationsverluste", "Cirkulācijas zudumi", "Циркулационни загуби"), "MWh"),
        line("QKu", tr("Domestic hot water", "Ciepła woda użytkowa", "Apă caldă menajeră", "Warmwasser", "Karstais ūdens", "Битова гореща вода"), "MWh"),
        line("QApkCz", tr("Space heating and circulation losses", "Ogrzewanie i straty cyrkulacji", "Încălzire și pierderi de circulație", "Raumheizung und Zirkulationsverluste", "Apkure un cirkulācijas zudumi", "Отопление и циркулационни загуби"), "MWh"),
        line("T1", tr("Average indoor temperature", "Średnia temperatura wewnętrzna", "Temperatura medie interioară", "Mittlere Innentemperatur", "Vidējā iekštelpu temperatūra", "Средна вътрешна температура"), "°C"),
        line("GDD", tr("Degree days", "Stopniodni", "Grade-zile", "Heizgradtage", "Grādu dienas", "Денградуси"), ""),
    ];
    table(BASELINE, tr("Baseline", "Stan bazowy", "Situația de referință", "Baseline", "Bāzes līnija", "Базова линия"), columns, rows)
}

// ============================================================================
// Fees and summary
// ============================================================================

fn excl_vat() -> String {
    tr("Excl. VAT", "Netto", "Fără TVA", "Exkl. USt", "Bez PVN", "Без ДДС")
}

fn vat() -> String {
    tr("VAT", "VAT", "TVA", "USt", "PVN", "ДДС")
}

fn incl_vat() -> String {
    tr("Incl. VAT", "Brutto", "Cu TVA", "Inkl. USt", "Ar PVN", "С ДДС")
}

/// Monthly fees. Rows: energy fee, renovation fee, operation fee.
/// Columns: 0 fee, 1 excl. VAT, 2 VAT, 3 incl. VAT.
fn summary_table() -> Table {
    let columns = vec![
        col(tr("Fee", "Opłata", "Taxă", "Entgelt", "Maksa", "Такса"), Kind::Name),
        col(excl_vat(), Kind::Money),
        col(vat(), Kind::Money),
        col(incl_vat(), Kind::Money),
    ];
    let rows = seeds(
        &columns,
        vec![
            tr("Energy fee", "Opłata za energię", "Taxa pentru energie", "Energieentgelt", "Maksa par enerģiju", "Такса за енергия"),
            tr("Renovation fee", "Opłata za renowację", "Taxa de renovare", "Sanierungsentgelt", "Renovācijas maksa", "Такса за обновяване"),
            tr("Operation and maintenance fee", "Opłata eksploatacyjna", "Taxa de operare și întreținere", "Betriebs- und Wartungsentgelt", "Apsaimniekošanas maksa", "Такса за експлоатация и поддръжка"),
        ],
    );
    table(SUMMARY, tr("Summary", "Podsumowanie", "Rezumat", "Zusammenfassung", "Kopsavilkums", "Обобщение"), columns, rows)
}

/// Columns: 0 period, 1 guaranteed consumption `a`, 2 tariff `b`,
/// 3 energy fee `a×b`, 4 degree days `d`, 5 actual consumption `f`,
/// 6 actual fee `f×b`.
fn balancing_period_fee_table() -> Table {
    let columns = vec![
        col(tr("Period", "Okres", "Perioadă", "Zeitraum", "Periods", "Период"), Kind::Name),
        col(tr("Guaranteed consumption", "Gwarantowane zużycie", "Consum garantat", "Garantierter Verbrauch", "Garantētais patēriņš", "Гарантирано потребление"), Kind::Energy),
        col(tr("Tariff", "Taryfa", "Tarif", "Tarif", "Tarifs", "Тарифа"), Kind::Money),
        col(tr("Energy fee", "Opłata za energię", "Taxa pentru energie", "Energieentgelt", "Maksa par enerģiju", "Такса за енергия"), Kind::Money),
        col(tr("Degree days", "Stopniodni", "Grade-zile", "Heizgradtage", "Grādu dienas", "Денградуси"), Kind::Decimal),
        col(tr("Actual consumption", "Rzeczywiste zużycie", "Consum real", "Tatsächlicher Verbrauch", "Faktiskais patēriņš", "Действително потребление"), Kind::Energy),
        col(tr("Actual fee", "Rzeczywista opłata", "Taxă reală", "Tatsächliches Entgelt", "Faktiskā maksa", "Действителна такса"), Kind::Money),
    ];
    let rows = seeds(
        &columns,
        vec![tr("Balancing period", "Okres rozliczeniowy", "Perioada de echilibrare", "Abrechnungszeitraum", "Norēķinu periods", "Балансиращ период")],
    );
    table(BALANCING_PERIOD_FEE, tr("Balancing period fee", "Opłata za okres rozliczeniowy", "Taxa perioadei de echilibrare", "Entgelt für den Ausgleichszeitraum", "Norēķinu perioda maksa", "Такса за изравнителен период"), columns, rows)
}

/// Columns: 0 item, 1 energy `a`, 2 tariff `b`, 3 yearly fee `a×b`,
/// 4 months `d`, 5 monthly fee `c/d`.
fn calc_energy_fee_table() -> Table {
    let columns = vec![
        col(tr("Item", "Pozycja", "Element", "Position", "Pozīcija", "Позиция"), Kind::Name),
        col(tr("Energy", "Energia", "Energie", "Energie", "Enerģija", "Енергия"), Kind::Energy),
        col(tr("Tariff", "Taryfa", "Tarif", "Tarif", "Tarifs", "Тарифа"), Kind::Money),
        col(tr("Yearly fee", "Opłata roczna", "Taxă anuală", "Jahresentgelt", "Gada maksa", "Годишна такса"), Kind::Money),
        col(tr("Months", "Miesiące", "Luni", "Monate", "Mēneši", "Месеци"), Kind::Count),
        col(tr("Monthly fee", "Opłata miesięczna", "Taxă lunară", "Monatsentgelt", "Mēneša maksa", "Месечна такса"), Kind::Money),
    ];
    let mut rows = seeds(
        &columns,
        vec![tr("Energy fee", "Opłata za energię", "Taxa pentru energie", "Energieentgelt", "Maksa par enerģiju", "Такса за енергия")],
    );
    rows[0] = Row::new(
        rows[0]
            .iter()
            .enumerate()
            .map(|(i, cell)| if i == 4 { "12".into() } else { cell.clone() })
            .collect(),
    );
    table(CALC_ENERGY_FEE, tr("Energy fee calculation", "Obliczenie opłaty za energię", "Calculul taxei pentru energie", "Berechnung des Energieentgelts", "Enerģijas maksas aprēķins", "Изчисляване на таксата за енергия"), columns, rows)
}

/// Columns: 0 activity, 1 yearly cost, 2 notes.
fn operation_maintenance_budget_table() -> Table {
    let columns = vec![
        col(tr("Activity", "Czynność", "Activitate", "Tätigkeit", "Darbība", "Дейност"), Kind::Name),
        col(tr("Yearly cost", "Koszt roczny", "Cost anual", "Jahreskosten", "Gada izmaksas", "Годишен разход"), Kind::Money),
        col(tr("Notes", "Uwagi", "Observații", "Anmerkungen", "Piezīmes", "Бележки"), Kind::String),
    ];
    let rows = seeds(
        &columns,
        vec![
            tr("Building envelope", "Przegrody budynku", "Anvelopa clădirii", "Gebäudehülle", "Ēkas norobežojošās konstrukcijas", "Ограждащи конструкции"),
            tr("Heating system", "Instalacja grzewcza", "Sistem de încălzire", "Heizungsanlage", "Apkures sistēma", "Отоплителна система"),
            tr("Ventilation", "Wentylacja", "Ventilație", "Lüftung", "Ventilācija", "Вентилация"),
            tr("Domestic hot water system", "Instalacja c.w.u.", "Sistem apă caldă", "Warmwasseranlage", "Karstā ūdens sistēma", "Система за гореща вода"),
            tr("Monitoring", "Monitoring", "Monitorizare", "Monitoring", "Monitorings", "Мониторинг"),
        ],
    );
    table(OPERATION_MAINTENANCE_BUDGET, tr("Operation and maintenance budget", "Budżet eksploatacji i utrzymania", "Bugetul de operare și întreținere", "Betriebs- und Wartungsbudget", "Ekspluatācijas un apkopes budžets", "Бюджет за експлоатация и поддръжка"), columns, rows)
}

/// Columns: 0 item, 1 description, 2 yearly fee, 3 monthly fee,
/// 4 heated area, 5 monthly fee per m².
fn operations_maintenance_fee_table() -> Table {
    let columns = vec![
        col(tr("Item", "Pozycja", "Element", "Position", "Pozīcija", "Позиция"), Kind::Name),
        col(tr("Description", "Opis", "Descriere", "Beschreibung", "Apraksts", "Описание"), Kind::String),
        col(tr("Yearly fee", "Opłata roczna", "Taxă anuală", "Jahresentgelt", "Gada maksa", "Годишна такса"), Kind::Money),
        col(tr("Monthly fee", "Opłata miesięczna", "Taxă lunară", "Monatsentgelt", "Mēneša maksa", "Месечна такса"), Kind::Money),
        col(tr("Heated area", "Powierzchnia ogrzewana", "Suprafață încălzită", "Beheizte Fläche", "Apkurināmā platība", "Отоплявана площ"), Kind::Area),
        col(tr("Monthly fee per m²", "Opłata miesięczna za m²", "Taxă lunară pe m²", "Monatsentgelt pro m²", "Mēneša maksa par m²", "Месечна такса на m²"), Kind::Money),
    ];
    let rows = seeds(
        &columns,
        vec![tr("Operation and maintenance", "Eksploatacja", "Operare și întreținere", "Betrieb und Wartung", "Apsaimniekošana", "Експлоатация и поддръжка")],
    );
    table(OPERATIONS_MAINTENANCE_FEE, tr("Operation and maintenance fee", "Opłata za eksploatację i utrzymanie", "Taxa de operare și întreținere", "Betriebs- und Wartungsentgelt", "Ekspluatācijas un apkopes maksa", "Такса за експлоатация и поддръжка"), columns, rows)
}

// ============================================================================
// Renovation budget
// ============================================================================

/// Columns shared by the four cost tables: 0 item, 1 description, 2 cost.
fn cost_columns() -> Vec<Column> {
    vec![
        col(tr("Item", "Pozycja", "Element", "Position", "Pozīcija", "Позиция"), Kind::Name),
        col(tr("Description", "Opis", "Descriere", "Beschreibung", "Apraksts", "Описание"), Kind::String),
        col(tr("Cost", "Koszt", "Cost", "Kosten", "Izmaksas", "Разход"), Kind::Money),
    ]
}

fn project_development_table() -> Table {
    let columns = cost_columns();
    let rows = seeds(
        &columns,
        vec![
            tr("Energy audit", "Audyt energetyczny", "Audit energetic", "Energieaudit", "Energoaudits", "Енергийно обследване"),
            tr("Technical design", "Projekt techniczny", "Proiect tehnic", "Technische Planung", "Tehniskais projekts", "Технически проект"),
            tr("Permits", "Pozwolenia", "Autorizații", "Genehmigungen", "Atļaujas", "Разрешителни"),
            tr("Project management", "Zarządzanie projektem", "Managementul proiectului", "Projektmanagement", "Projekta vadība", "Управление на проекта"),
        ],
    );
    table(PROJECT_DEVELOPMENT_RENOVATIONS, tr("Project development", "Przygotowanie projektu", "Dezvoltarea proiectului", "Projektentwicklung", "Projekta izstrāde", "Разработване на проекта"), columns, rows)
}

fn construction_costs_table() -> Table {
    let columns = cost_columns();
    let rows = seeds(
        &columns,
        vec![
            tr("Facade insulation", "Docieplenie elewacji", "Izolarea fațadei", "Fassadendämmung", "Fasādes siltināšana", "Изолация на фасадата"),
            tr("Roof insulation", "Docieplenie dachu", "Izolarea acoperișului", "Dachdämmung", "Jumta siltināšana", "Изолация на покрива"),
            tr("Basement ceiling insulation", "Docieplenie stropu piwnicy", "Izolarea plafonului subsolului", "Kellerdeckendämmung", "Pagraba pārseguma siltināšana", "Изолация на тавана на мазето"),
            tr("Windows", "Okna", "Ferestre", "Fenster", "Logi", "Прозорци"),
            tr("Heating system", "Instalacja grzewcza", "Sistem de încălzire", "Heizungsanlage", "Apkures sistēma", "Отоплителна система"),
            tr("Ventilation", "Wentylacja", "Ventilație", "Lüftung", "Ventilācija", "Вентилация"),
            tr("Domestic hot water system", "Instalacja c.w.u.", "Sistem apă caldă", "Warmwasseranlage", "Karstā ūdens sistēma", "Система за гореща вода"),
        ],
    );
    table(CONSTRUCTION_COSTS_RENOVATIONS, tr("Construction costs", "Koszty budowy", "Costuri de construcție", "Baukosten", "Būvniecības izmaksas", "Строителни разходи"), columns, rows)
}

fn project_supervision_table() -> Table {
    let columns = cost_columns();
    let rows = seeds(
        &columns,
        vec![
            tr("Construction supervision", "Nadzór budowlany", "Diriginte de șantier", "Bauaufsicht", "Būvuzraudzība", "Строителен надзор"),
            tr("Author supervision", "Nadzór autorski", "Asistență tehnică proiectant", "Planeraufsicht", "Autoruzraudzība", "Авторски надзор"),
        ],
    );
    table(PROJECT_SUPERVISION, tr("Project supervision", "Nadzór nad projektem", "Supravegherea proiectului", "Projektaufsicht", "Projekta uzraudzība", "Надзор на проекта"), columns, rows)
}

fn financial_charges_table() -> Table {
    let columns = cost_columns();
    let rows = seeds(
        &columns,
        vec![
            tr("Loan arrangement fee", "Prowizja kredytowa", "Comision de acordare", "Bearbeitungsgebühr", "Aizdevuma noformēšanas maksa", "Такса за отпускане на кредит"),
            tr("Interest during construction", "Odsetki w okresie budowy", "Dobânda în perioada de construcție", "Bauzeitzinsen", "Procenti būvniecības laikā", "Лихви по време на строителството"),
            tr("Insurance", "Ubezpieczenie", "Asigurare", "Versicherung", "Apdrošināšana", "Застраховка"),
        ],
    );
    table(FINANCIAL_CHARGES, tr("Financial charges", "Koszty finansowe", "Costuri financiare", "Finanzierungskosten", "Finanšu izmaksas", "Финансови разходи"), columns, rows)
}

/// Rows 0..3 mirror the four cost tables, row 4 is the total.
/// Columns: 0 item, 1 cost, 2 share.
fn renovation_overall_budget_table() -> Table {
    let columns = vec![
        col(tr("Item", "Pozycja", "Element", "Position", "Pozīcija", "Позиция"), Kind::Name),
        col(tr("Cost", "Koszt", "Cost", "Kosten", "Izmaksas", "Разход"), Kind::Money),
        col(tr("Share", "Udział", "Pondere", "Anteil", "Daļa", "Дял"), Kind::Percent),
    ];
    let rows = seeds(
        &columns,
        vec![
            tr("Project development", "Przygotowanie projektu", "Dezvoltarea proiectului", "Projektentwicklung", "Projekta sagatavošana", "Разработване на проекта"),
            tr("Construction", "Budowa", "Construcție", "Bau", "Būvniecība", "Строителство"),
            tr("Supervision", "Nadzór", "Supraveghere", "Aufsicht", "Uzraudzība", "Надзор"),
            tr("Financial charges", "Koszty finansowe", "Costuri financiare", "Finanzierungskosten", "Finanšu izmaksas", "Финансови разходи"),
            tr("Total", "Razem", "Total", "Gesamt", "Kopā", "Общо"),
        ],
    );
    table(RENOVATION_OVERALL_BUDGET, tr("Renovation overall budget", "Całkowity budżet renowacji", "Bugetul total al renovării", "Gesamtbudget der Sanierung", "Renovācijas kopējais budžets", "Общ бюджет на обновяването"), columns, rows)
}

/// Row 4 holds the total incl. VAT. Columns: 0 source, 1 amount, 2 share.
fn renovation_financial_plan_table() -> Table {
    let columns = vec![
        col(tr("Source", "Źródło", "Sursă", "Quelle", "Avots", "Източник"), Kind::Name),
        col(tr("Amount", "Kwota", "Sumă", "Betrag", "Summa", "Сума"), Kind::Money),
        col(tr("Share", "Udział", "Pondere", "Anteil", "Daļa", "Дял"), Kind::Percent),
    ];
    let rows = seeds(
        &columns,
        vec![
            tr("Grant", "Dotacja", "Grant", "Förderung", "Grants", "Безвъзмездна помощ"),
            tr("Loan", "Kredyt", "Împrumut", "Darlehen", "Aizdevums", "Заем"),
            tr("Owner contribution", "Wkład właściciela", "Contribuția proprietarului", "Eigentümerbeitrag", "Īpašnieku līdzfinansējums", "Принос на собственика"),
            tr("Contractor contribution", "Wkład wykonawcy", "Contribuția contractorului", "Beitrag des Auftragnehmers", "Izpildītāja līdzfinansējums", "Принос на изпълнителя"),
            tr("Total incl. VAT", "Razem brutto", "Total cu TVA", "Gesamt inkl. USt", "Kopā ar PVN", "Общо с ДДС"),
        ],
    );
    table(RENOVATION_FINANCIAL_PLAN, tr("Renovation financial plan", "Plan finansowy renowacji", "Planul financiar al renovării", "Finanzierungsplan der Sanierung", "Renovācijas finanšu plāns", "Финансов план на обновяването"), columns, rows)
}

// ============================================================================
// Schedules
// ============================================================================

/// Loan amortization, one row per month.
///
/// Columns: 0 number, 1 date, 2 beginning balance, 3 payment,
/// 4 ending balance. Payments start empty; the schedule ends at the first
/// empty payment.
fn project_measurements_table() -> Table {
    let columns = vec![
        col(tr("No.", "Nr", "Nr.", "Nr.", "Nr.", "№"), Kind::Name),
        col(tr("Date", "Data", "Data", "Datum", "Datums", "Дата"), Kind::String),
        col(tr("Beginning balance", "Saldo początkowe", "Sold inițial", "Anfangssaldo", "Sākuma atlikums", "Начално салдо"), Kind::Money),
        col(tr("Payment", "Rata", "Plată", "Rate", "Maksājums", "Вноска"), Kind::Money),
        col(tr("Ending balance", "Saldo końcowe", "Sold final", "Endsaldo", "Beigu atlikums", "Крайно салдо"), Kind::Money),
    ];
    let rows = (1..=SCHEDULE_MONTHS)
        .map(|n| Row::new(vec![n.to_string().into(), "".into(), "".into(), "".into(), "".into()]))
        .collect();
    table(PROJECT_MEASUREMENTS_TABLE, tr("Amortization schedule", "Harmonogram spłat", "Graficul de amortizare", "Tilgungsplan", "Amortizācijas grafiks", "Погасителен план"), columns, rows)
}

/// Monitoring results, 20 years × 12 months.
///
/// Columns: 0 year, 1 month, 2 energy consumption, 3 degree days,
/// 4 indoor temperature.
fn monitoring_phase_table() -> Table {
    let columns = vec![
        col(tr("Year", "Rok", "An", "Jahr", "Gads", "Година"), Kind::Name),
        month_column(),
        col(tr("Energy consumption", "Zużycie energii", "Consum de energie", "Energieverbrauch", "Enerģijas patēriņš", "Потребление на енергия"), Kind::Energy),
        col(tr("Degree days", "Stopniodni", "Grade-zile", "Heizgradtage", "Grādu dienas", "Денградуси"), Kind::Decimal),
        col(tr("Indoor temperature", "Temperatura wewnętrzna", "Temperatura interioară", "Innentemperatur", "Iekštelpu temperatūra", "Вътрешна температура"), Kind::Temperature),
    ];
    let month_names = months();
    let rows = (1..=SCHEDULE_MONTHS / 12)
        .flat_map(|year| {
            month_names.iter().map(move |month| {
                Row::new(vec![
                    year.to_string().into(),
                    month.clone().into(),
                    "0".into(),
                    "0".into(),
                    "0".into(),
                ])
            })
        })
        .collect();
    table(MONITORING_PHASE_TABLE, tr("Monitoring phase", "Faza monitoringu", "Faza de monitorizare", "Überwachungsphase", "Monitoringa fāze", "Фаза на мониторинг"), columns, rows)
}

// ============================================================================
// Maintenance and work phases
// ============================================================================

fn activity_column() -> Column {
    col(tr("Activity", "Czynność", "Activitate", "Tätigkeit", "Darbība", "Дейност"), Kind::Name)
}

fn frequency_column() -> Column {
    col(tr("Frequency", "Częstotliwość", "Frecvență", "Häufigkeit", "Biežums", "Честота"), Kind::String)
}

fn description_column() -> Column {
    col(tr("Description", "Opis", "Descriere", "Beschreibung", "Apraksts", "Описание"), Kind::String)
}

fn periodic_maintenance_table() -> Table {
    let columns = vec![
        activity_column(),
        frequency_column(),
        col(tr("Responsible", "Odpowiedzialny", "Responsabil", "Verantwortlich", "Atbildīgais", "Отговорник"), Kind::String),
    ];
    let rows = seeds(
        &columns,
        vec![
            tr("Heating substation inspection", "Przegląd węzła cieplnego", "Inspecția punctului termic", "Inspektion der Übergabestation", "Siltummezgla apskate", "Преглед на абонатната станция"),
            tr("Ventilation filter replacement", "Wymiana filtrów wentylacji", "Înlocuirea filtrelor de ventilație", "Filterwechsel Lüftung", "Ventilācijas filtru nomaiņa", "Смяна на вентилационни филтри"),
            tr("Roof and gutter inspection", "Przegląd dachu i rynien", "Inspecția acoperișului și jgheaburilor", "Dach- und Rinnenkontrolle", "Jumta un noteku apskate", "Преглед на покрив и улуци"),
        ],
    );
    table(PERIODIC_MAINT_ACTIVITIES, tr("Periodic maintenance activities", "Okresowe czynności konserwacyjne", "Activități periodice de întreținere", "Regelmäßige Wartungsarbeiten", "Periodiskās apkopes darbi", "Периодични дейности по поддръжка"), columns, rows)
}

fn mid_term_preventative_table() -> Table {
    let columns = vec![
        activity_column(),
        description_column(),
        col(tr("Year", "Rok", "An", "Jahr", "Gads", "Година"), Kind::Count),
    ];
    let rows = seeds(
        &columns,
        vec![
            tr("Facade cleaning", "Czyszczenie elewacji", "Curățarea fațadei", "Fassadenreinigung", "Fasādes tīrīšana", "Почистване на фасадата"),
            tr("Pump overhaul", "Remont pomp", "Revizia pompelor", "Pumpenrevision", "Sūkņu remonts", "Ремонт на помпи"),
        ],
    );
    table(MID_TERM_PREVENTATIVE_ACTIVITY, tr("Mid-term preventative activities", "Średnioterminowe działania zapobiegawcze", "Activități preventive pe termen mediu", "Mittelfristige vorbeugende Maßnahmen", "Vidēja termiņa profilaktiskie darbi", "Средносрочни превантивни дейности"), columns, rows)
}

fn long_term_provisioned_table() -> Table {
    let columns = vec![
        activity_column(),
        description_column(),
        col(tr("Provision", "Rezerwa", "Provizion", "Rückstellung", "Uzkrājums", "Провизия"), Kind::Money),
    ];
    let rows = seeds(
        &columns,
        vec![
            tr("Roof membrane renewal", "Wymiana pokrycia dachu", "Reînnoirea membranei acoperișului", "Erneuerung der Dachabdichtung", "Jumta seguma atjaunošana", "Подмяна на покривната мембрана"),
            tr("Heat exchanger replacement", "Wymiana wymiennika ciepła", "Înlocuirea schimbătorului de căldură", "Tausch des Wärmetauschers", "Siltummaiņa nomaiņa", "Подмяна на топлообменника"),
        ],
    );
    table(LONG_TERM_PROVISIONED_ACTIVITIES, tr("Long-term provisioned activities", "Długoterminowe działania rezerwowe", "Activități provizionate pe termen lung", "Langfristig rückgestellte Maßnahmen", "Ilgtermiņa uzkrājumu darbi", "Дългосрочни провизирани дейности"), columns, rows)
}

fn recommended_maintenance_table() -> Table {
    let columns = vec![activity_column(), frequency_column()];
    let rows = seeds(
        &columns,
        vec![
            tr("Keep stairwell doors closed", "Zamykanie drzwi klatki schodowej", "Păstrarea ușilor casei scării închise", "Stiegenhaustüren geschlossen halten", "Kāpņu telpas durvis turēt aizvērtas", "Затваряне на вратите на стълбището"),
            tr("Bleed radiators", "Odpowietrzanie grzejników", "Aerisirea caloriferelor", "Heizkörper entlüften", "Radiatoru atgaisošana", "Обезвъздушаване на радиаторите"),
        ],
    );
    table(RECOMMENDED_MAINTENANCE_ACTIVITY, tr("Recommended maintenance activities", "Zalecane czynności konserwacyjne", "Activități de întreținere recomandate", "Empfohlene Wartungsarbeiten", "Ieteicamie apkopes darbi", "Препоръчителни дейности по поддръжка"), columns, rows)
}

fn maintenance_log_table() -> Table {
    let columns = vec![
        col(tr("Date", "Data", "Data", "Datum", "Datums", "Дата"), Kind::Name),
        col(tr("Activity", "Czynność", "Activitate", "Tätigkeit", "Darbība", "Дейност"), Kind::String),
        col(tr("Performed by", "Wykonawca", "Executat de", "Durchgeführt von", "Izpildītājs", "Изпълнител"), Kind::String),
        col(tr("Notes", "Uwagi", "Observații", "Anmerkungen", "Piezīmes", "Бележки"), Kind::String),
    ];
    table(MAINTENANCE_LOG, tr("Maintenance log", "Dziennik konserwacji", "Jurnal de întreținere", "Wartungsprotokoll", "Apkopes žurnāls", "Дневник за поддръжка"), columns, Vec::new())
}

fn work_phase_scope_table() -> Table {
    let columns = vec![
        col(tr("Work phase", "Etap prac", "Etapa lucrărilor", "Bauphase", "Darbu posms", "Етап"), Kind::Name),
        col(tr("Scope", "Zakres", "Domeniu", "Umfang", "Apjoms", "Обхват"), Kind::String),
        col(tr("Deadline", "Termin", "Termen", "Frist", "Termiņš", "Срок"), Kind::String),
    ];
    let rows = seeds(
        &columns,
        vec![
            tr("Preparation", "Przygotowanie", "Pregătire", "Vorbereitung", "Sagatavošana", "Подготовка"),
            tr("Construction", "Budowa", "Construcție", "Bau", "Būvniecība", "Строителство"),
            tr("Commissioning", "Odbiór", "Recepție", "Inbetriebnahme", "Nodošana ekspluatācijā", "Въвеждане в експлоатация"),
        ],
    );
    table(WORK_PHASE_SCOPE_RENOVATION, tr("Work phases and scope", "Etapy i zakres prac", "Etapele și domeniul lucrărilor", "Arbeitsphasen und Umfang", "Darbu posmi un apjoms", "Етапи и обхват на работите"), columns, rows)
}
