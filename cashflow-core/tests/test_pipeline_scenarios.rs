use cashflow_core::{
    EventKind, FinancialEvent, MonthKey, SkipReason, Tz, group, month_key_for, process_events,
};
use chrono::{TimeZone, Utc};

fn ts(y: i32, m: u32, d: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap().timestamp()
}

fn income(id: &str, date: i64, amount: f64) -> FinancialEvent {
    FinancialEvent::new(id, format!("income {id}"), date, amount, EventKind::Income)
}

fn expense(id: &str, date: i64, amount: f64) -> FinancialEvent {
    FinancialEvent::new(id, format!("expense {id}"), date, amount, EventKind::Expense)
}

fn key(s: &str) -> MonthKey {
    s.parse().unwrap()
}

#[test]
fn test_single_income_on_top_of_initial_money() {
    let report = process_events(vec![income("salary", ts(2024, 1, 15), 500.0)], 1000.0, &Tz::UTC);

    assert_eq!(report.flows.len(), 1);
    let jan = &report.flows[0];
    assert_eq!(jan.key.to_string(), "2024-01");
    assert_eq!(jan.income, 500.0);
    assert_eq!(jan.expense, 0.0);
    assert_eq!(jan.monthly, 500.0);
    assert_eq!(jan.global, 1500.0);
}

#[test]
fn test_two_months_carry_the_running_balance() {
    let events = vec![
        income("pay", ts(2024, 1, 5), 200.0),
        expense("food", ts(2024, 1, 20), 50.0),
        expense("bus", ts(2024, 2, 3), 30.0),
    ];
    let report = process_events(events, 0.0, &Tz::UTC);

    let jan = report.get(&key("2024-01")).unwrap();
    assert_eq!((jan.income, jan.expense, jan.monthly, jan.global), (200.0, 50.0, 150.0, 150.0));

    let feb = report.get(&key("2024-02")).unwrap();
    assert_eq!((feb.income, feb.expense, feb.monthly, feb.global), (0.0, 30.0, -30.0, 120.0));
}

#[test]
fn test_starting_in_debt() {
    let report = process_events(vec![income("gift", ts(2024, 4, 1), 100.0)], -100.0, &Tz::UTC);
    assert_eq!(report.flows[0].monthly, 100.0);
    assert_eq!(report.flows[0].global, 0.0);
}

#[test]
fn test_zero_amounts_leave_balance_unchanged() {
    let events = vec![
        income("zero-in", ts(2024, 5, 1), 0.0),
        expense("zero-out", ts(2024, 5, 2), 0.0),
    ];
    let report = process_events(events, 321.5, &Tz::UTC);
    let may = &report.flows[0];
    assert_eq!((may.income, may.expense, may.monthly), (0.0, 0.0, 0.0));
    assert_eq!(may.global, 321.5);
    assert_eq!(may.events.len(), 2);
}

#[test]
fn test_out_of_order_input_is_folded_chronologically() {
    let events = vec![
        expense("march", ts(2024, 3, 12), 40.0),
        income("january", ts(2024, 1, 5), 100.0),
    ];
    let report = process_events(events, 10.0, &Tz::UTC);

    let keys: Vec<String> = report.flows.iter().map(|f| f.key.to_string()).collect();
    assert_eq!(keys, ["2024-01", "2024-03"]);
    assert_eq!(report.flows[0].global, 110.0);
    assert_eq!(report.flows[1].global, 70.0);

    let sum_monthly: f64 = report.flows.iter().map(|f| f.monthly).sum();
    assert_eq!(report.current_balance(), 10.0 + sum_monthly);
}

#[test]
fn test_empty_input_gives_no_buckets() {
    let report = process_events(Vec::new(), 0.0, &Tz::UTC);
    assert!(report.flows.is_empty());
    assert_eq!(report.skipped_count(), 0);
}

#[test]
fn test_undated_events_are_excluded_and_reported() {
    let events = vec![
        income("dated", ts(2024, 1, 5), 100.0),
        income("undated", 0, 999.0).undated(),
    ];
    let report = process_events(events, 0.0, &Tz::UTC);

    assert_eq!(report.flows.len(), 1);
    assert_eq!(report.flows[0].income, 100.0);
    assert!(report
        .flows
        .iter()
        .all(|f| f.events.iter().all(|e| e.id != "undated")));
    assert_eq!(report.skipped_count(), 1);
    assert_eq!(report.skipped[0].reason, SkipReason::MissingDate);
    assert_eq!(report.skipped[0].event.id, "undated");
}

fn sample_events() -> Vec<FinancialEvent> {
    vec![
        income("a", ts(2023, 11, 30), 1200.0),
        expense("b", ts(2023, 11, 2), 310.25),
        expense("c", ts(2024, 1, 5), 99.99),
        income("d", ts(2024, 2, 14), 0.1),
        income("e", ts(2024, 2, 28), 0.2),
        expense("f", ts(2024, 2, 3), 0.3),
        expense("g", ts(2024, 3, 5), 1500.0),
        income("h", ts(2024, 1, 20), 42.0),
    ]
}

#[test]
fn test_every_dated_event_lands_in_exactly_one_matching_bucket() {
    let events = sample_events();
    let grouping = group(events.clone(), &Tz::UTC);

    let placed: usize = grouping.buckets.values().map(|b| b.events.len()).sum();
    assert_eq!(placed, events.len());

    for event in &events {
        let expected = month_key_for(event.date.unwrap(), &Tz::UTC).unwrap();
        let holders: Vec<&MonthKey> = grouping
            .buckets
            .iter()
            .filter(|(_, b)| b.events.iter().any(|e| e.id == event.id))
            .map(|(k, _)| k)
            .collect();
        assert_eq!(holders, vec![&expected], "event {} misplaced", event.id);
    }
}

#[test]
fn test_running_balance_chain_holds() {
    let initial = 57.5;
    let report = process_events(sample_events(), initial, &Tz::UTC);

    let mut previous = initial;
    for flow in &report.flows {
        assert_eq!(flow.monthly, flow.income - flow.expense);
        assert_eq!(flow.global, previous + flow.monthly);
        previous = flow.global;
    }
    for pair in report.flows.windows(2) {
        assert!(pair[0].key < pair[1].key);
    }
}

#[test]
fn test_sums_are_permutation_invariant() {
    let baseline = process_events(sample_events(), 0.0, &Tz::UTC);

    let mut reversed = sample_events();
    reversed.reverse();
    let mut rotated = sample_events();
    rotated.rotate_left(3);

    for permuted in [reversed, rotated] {
        let report = process_events(permuted, 0.0, &Tz::UTC);
        assert_eq!(report.flows.len(), baseline.flows.len());
        for (a, b) in report.flows.iter().zip(&baseline.flows) {
            assert_eq!(a.key, b.key);
            assert!((a.income - b.income).abs() < 1e-9);
            assert!((a.expense - b.expense).abs() < 1e-9);
            assert!((a.global - b.global).abs() < 1e-9);
        }
    }
}

#[test]
fn test_recomputing_is_idempotent() {
    let first = process_events(sample_events(), 12.0, &Tz::UTC);
    let second = process_events(sample_events(), 12.0, &Tz::UTC);
    assert_eq!(first, second);
}

#[test]
fn test_changing_initial_money_shifts_every_global() {
    let base = process_events(sample_events(), 0.0, &Tz::UTC);
    let shifted = process_events(sample_events(), 1000.0, &Tz::UTC);
    for (a, b) in base.flows.iter().zip(&shifted.flows) {
        assert_eq!(a.monthly, b.monthly);
        assert!((b.global - a.global - 1000.0).abs() < 1e-9);
    }
}

#[test]
fn test_timezone_policy_moves_month_boundary_events() {
    // 2024-02-01T03:00:00Z: February in UTC, January in Chicago
    let events = vec![expense("edge", 1_706_756_400, 10.0)];

    let utc = process_events(events.clone(), 0.0, &Tz::UTC);
    assert_eq!(utc.flows[0].key.to_string(), "2024-02");

    let chicago = process_events(events, 0.0, &Tz::America__Chicago);
    assert_eq!(chicago.flows[0].key.to_string(), "2024-01");
}

#[test]
fn test_report_serializes_month_keys_as_strings() {
    let report = process_events(vec![income("a", ts(2024, 1, 5), 1.0)], 0.0, &Tz::UTC);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["flows"][0]["key"], "2024-01");
    assert_eq!(json["flows"][0]["events"][0]["type"], "income");
    assert_eq!(json["initial_money"], 0.0);
}
