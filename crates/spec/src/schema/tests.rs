use chrono::NaiveDate;

use super::*;

const FULL_SPEC: &str = r#"
[project]
name = "Search Monitoring"
platform = "fenix"
xaxis = "build_id"
start_date = "2022-01-01"
end_date = 2022-02-01
metrics = ["searches"]

[project.population]
data_source = "main"
channel = "release"
dimensions = ["os"]

[metrics.searches]
select_expression = "SUM(search_count)"
data_source = "main"
type = "histogram"

[metrics.searches.statistics.percentile]
percentiles = [50, 90]

[data_sources.main]
from_expression = "telemetry.main"
client_id_column = "client_id"

[dimensions.os]
select_expression = "normalized_os"
data_source = "main"
"#;

#[test]
fn parses_all_sections() {
    let spec = MonitoringSpec::from_toml_str(FULL_SPEC).unwrap();

    assert_eq!(spec.project.name.as_deref(), Some("Search Monitoring"));
    assert_eq!(spec.project.platform.as_deref(), Some("fenix"));
    assert_eq!(spec.project.xaxis, Some(XAxis::BuildId));
    assert_eq!(spec.project.metrics, Some(vec!["searches".to_string()]));
    assert_eq!(spec.project.population.channel.as_deref(), Some("release"));

    let metric = &spec.metrics["searches"];
    assert_eq!(metric.kind, MetricType::Histogram);
    assert_eq!(metric.data_source, "main");
    assert!(metric.statistics.contains_key("percentile"));

    assert_eq!(spec.data_sources["main"].from_expression, "telemetry.main");
    assert_eq!(spec.dimensions["os"].select_expression, "normalized_os");
}

#[test]
fn accepts_quoted_and_literal_dates() {
    let spec = MonitoringSpec::from_toml_str(FULL_SPEC).unwrap();
    assert_eq!(spec.project.start_date, NaiveDate::from_ymd_opt(2022, 1, 1));
    assert_eq!(spec.project.end_date, NaiveDate::from_ymd_opt(2022, 2, 1));
}

#[test]
fn empty_document_is_valid() {
    let spec = MonitoringSpec::from_toml_str("").unwrap();
    assert_eq!(spec, MonitoringSpec::default());
    assert!(!spec.project.skips_default_metrics());
    assert!(!spec.project.monitors_entire_population());
}

#[test]
fn unknown_section_is_rejected() {
    let err = MonitoringSpec::from_toml_str("[alerts]\nfoo = 1\n");
    assert!(err.is_err());
}

#[test]
fn invalid_date_is_rejected() {
    let err = MonitoringSpec::from_toml_str("[project]\nstart_date = \"January\"\n");
    assert!(err.is_err());
}

#[test]
fn parse_date_ignores_time_suffix() {
    assert_eq!(
        parse_date("2022-03-04T00:00:00Z").unwrap(),
        NaiveDate::from_ymd_opt(2022, 3, 4).unwrap()
    );
    assert!(parse_date("04/03/2022").is_err());
}

#[test]
fn metric_requires_data_source() {
    let err = MonitoringSpec::from_toml_str("[metrics.a]\nselect_expression = \"1\"\n");
    assert!(err.is_err());
}

#[test]
fn kind_merge_order_is_declaration_order() {
    let mut sorted = FragmentKind::MERGE_ORDER;
    sorted.sort();
    assert_eq!(sorted, FragmentKind::MERGE_ORDER);
    assert_eq!(FragmentKind::MERGE_ORDER.last(), Some(&FragmentKind::Override));
}

#[test]
fn kind_display_round_trips() {
    for kind in FragmentKind::MERGE_ORDER {
        assert_eq!(kind.to_string().parse::<FragmentKind>().unwrap(), kind);
    }
    assert!("bogus".parse::<FragmentKind>().is_err());
}

#[test]
fn fragment_parse_keeps_identity() {
    let fragment = SpecFragment::parse("my-slug", FragmentKind::Override, FULL_SPEC).unwrap();
    assert_eq!(fragment.slug(), "my-slug");
    assert_eq!(fragment.kind(), FragmentKind::Override);
    assert_eq!(fragment.provenance().len(), 1);
    assert_eq!(fragment.path().to_str(), Some("my-slug"));
}
