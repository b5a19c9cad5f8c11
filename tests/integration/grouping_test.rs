use product_audit::config::ColumnMap;
use product_audit::grouping::group_rows;
use product_audit::structures::{GroupKey, Row};

use crate::rows;

#[test]
fn test_shoes_scenario() {
    let rows = rows(&[
        ("shoes", "NY", "r1"),
        ("shoes", "NY", "r2"),
        ("shoes", "LA", "r3"),
        ("shoes", "NY", "r4"),
    ]);
    let groups = group_rows(&rows, &ColumnMap::default());

    let shape: Vec<(&str, &str, usize)> = groups
        .iter()
        .map(|g| (g.query.as_str(), g.city.as_str(), g.product_agent_response.total_results))
        .collect();
    assert_eq!(shape, vec![("shoes", "NY", 2), ("shoes", "LA", 1), ("shoes", "NY", 1)]);
}

#[test]
fn test_every_row_lands_once_in_order() {
    let input = [
        ("a", "x", "1"),
        ("a", "x", "2"),
        ("b", "x", "3"),
        ("a", "y", "4"),
        ("a", "y", "5"),
        ("a", "y", "6"),
        ("a", "x", "7"),
        ("", "", "8"),
    ];
    let groups = group_rows(&rows(&input), &ColumnMap::default());

    let titles: Vec<&str> = groups
        .iter()
        .flat_map(|g| g.results().iter().map(|r| r.title.as_str()))
        .collect();
    assert_eq!(titles, vec!["1", "2", "3", "4", "5", "6", "7", "8"]);

    let total: usize = groups.iter().map(|g| g.product_agent_response.total_results).sum();
    assert_eq!(total, input.len());

    for g in &groups {
        assert_eq!(g.product_agent_response.total_results, g.results().len());
    }
}

#[test]
fn test_adjacent_groups_never_share_a_key() {
    let input = [
        ("a", "x", "1"),
        ("b", "x", "2"),
        ("b", "x", "3"),
        ("a", "x", "4"),
        ("a", "x", "5"),
        ("b", "y", "6"),
    ];
    let groups = group_rows(&rows(&input), &ColumnMap::default());

    for pair in groups.windows(2) {
        assert_ne!(pair[0].key(), pair[1].key());
    }

    // Rebuilding the key sequence from the groups reproduces the input's
    let rebuilt: Vec<GroupKey> = groups
        .iter()
        .flat_map(|g| std::iter::repeat(g.key()).take(g.results().len()))
        .collect();
    let expected: Vec<GroupKey> = input.iter().map(|(q, c, _)| GroupKey::new(q, c)).collect();
    assert_eq!(rebuilt, expected);
}

#[test]
fn test_non_merge_a_b_a() {
    let groups = group_rows(
        &rows(&[("a", "x", "1"), ("b", "x", "2"), ("a", "x", "3")]),
        &ColumnMap::default(),
    );
    assert_eq!(groups.len(), 3);
    assert_eq!(groups[0].results()[0].title, "1");
    assert_eq!(groups[2].results()[0].title, "3");
}

#[test]
fn test_query_fields_come_from_first_row() {
    let mut first = crate::line("shoes", "NY", "r1");
    let mut second = crate::line("shoes", "NY", "r2");
    // agent1_name_V32 and date_V32 differ between the two rows
    first[8] = "agent-first".to_string();
    second[8] = "agent-second".to_string();
    first[19] = "2025-01-01".to_string();
    second[19] = "2025-02-02".to_string();

    let grid = vec![
        crate::HEADER.iter().map(|h| h.to_string()).collect(),
        first,
        second,
    ];
    let rows = product_audit::normalization::normalize_rows(grid);
    let groups = group_rows(&rows, &ColumnMap::default());

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].query_agent_response.agent_name, "agent-first");
    assert_eq!(groups[0].metadata.date, "2025-01-01");
    assert_eq!(groups[0].query_agent_response.predicted_attributes["color"], "black");
}

#[test]
fn test_result_fields_and_aliases() {
    let groups = group_rows(&rows(&[("shoes", "NY", "r1")]), &ColumnMap::default());
    let result = &groups[0].results()[0];

    assert_eq!(result.relevance, "Relevant");
    assert_eq!(result.relevance_reasoning, "why r1");
    // only the unspaced spelling is present in the header
    assert_eq!(result.super_audit_relevance, "Highly Relevant");
    assert_eq!(result.critical_relevance_reasoning, "");
    assert_eq!(result.image, "");
}

#[test]
fn test_alias_priority_first_non_empty_wins() {
    let row: Row = [
        ("query", "q"),
        ("cityname", "c"),
        ("super_audit_relevance", "primary"),
        ("superaudit_relevance", "secondary"),
        ("relevance reasoning_V32", ""),
        ("relevance_reasoning_V32", "fallback"),
    ]
    .into_iter()
    .collect();

    let groups = group_rows(&[row], &ColumnMap::default());
    let result = &groups[0].results()[0];
    assert_eq!(result.super_audit_relevance, "primary");
    assert_eq!(result.relevance_reasoning, "fallback");
}

#[test]
fn test_custom_column_map() {
    let columns = ColumnMap::from_toml_str(r#"city = "city""#).unwrap();
    let rows: Vec<Row> = vec![
        [("query", "q"), ("city", "Paris")].into_iter().collect(),
        [("query", "q"), ("city", "Lyon")].into_iter().collect(),
    ];

    let groups = group_rows(&rows, &columns);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].city, "Paris");
}

#[test]
fn test_serialized_field_names() {
    let groups = group_rows(&rows(&[("shoes", "NY", "r1")]), &ColumnMap::default());
    let json = serde_json::to_value(&groups[0]).unwrap();

    assert_eq!(json["query"], "shoes");
    assert_eq!(json["city"], "NY");
    assert_eq!(json["query_agent_response"]["agent_name"], "query-agent");
    assert_eq!(json["query_agent_response"]["predicted_attributes"]["color"], "black");
    assert_eq!(json["product_agent_response"]["total_results"], 1);
    assert_eq!(json["product_agent_response"]["results"][0]["search_page_url"], "");
    assert_eq!(json["metadata"]["workflow"], "wf");
}
