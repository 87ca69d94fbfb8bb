use std::fs;
use std::time::{Duration, Instant};

use masothue::process::{enrich_file, process_row, run_pipeline, EnrichJob, PipelineOptions, RowOutcome};
use masothue::request::{LookupClient, LookupConfig};
use masothue::table::{read_table, Sheet};
use masothue::Error;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const NO_DELAY: PipelineOptions = PipelineOptions {
    delay: Duration::ZERO,
    timeout: Duration::from_secs(5),
};

fn detail_page(id: &str, name: &str) -> String {
    format!(
        "<html><body><h1>{id} - {name}</h1>\
         <table class=\"table-taxinfo\">\
           <tr><td>Mã số thuế</td><td>{id}</td></tr>\
           <tr><td>Tình trạng</td><td>Đang hoạt động</td></tr>\
           <tr><td>Địa chỉ</td><td>Hà Nội</td></tr>\
         </table></body></html>"
    )
}

async fn mount_detail(server: &MockServer, id: &str, name: &str) {
    Mock::given(method("GET"))
        .and(path("/Search/"))
        .and(query_param("q", id))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page(id, name)))
        .mount(server)
        .await;
}

fn client_for(server: &MockServer) -> LookupClient {
    LookupClient::new(LookupConfig::with_base_url(server.uri()))
}

#[tokio::test]
async fn blank_row_is_skipped_without_a_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let outcome = process_row(&client_for(&server), "   ", NO_DELAY.timeout).await;
    assert!(matches!(outcome, RowOutcome::Skipped));
}

#[tokio::test]
async fn row_failures_carry_the_identifier() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "0100100100"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Không tìm thấy</h1>"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(query_param("q", "0305029405"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<p>0305029405</p>"))
        .mount(&server)
        .await;
    let client = client_for(&server);

    match process_row(&client, " 0100100100 ", NO_DELAY.timeout).await {
        RowOutcome::Failed { identifier, error } => {
            assert_eq!(identifier, "0100100100");
            assert!(matches!(error, Error::IdentifierNotFound(_)));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    match process_row(&client, "0305029405", NO_DELAY.timeout).await {
        RowOutcome::Failed { error, .. } => assert!(matches!(error, Error::InsufficientData(_))),
        other => panic!("unexpected outcome: {other:?}"),
    }
    match process_row(&client, "0999999999", NO_DELAY.timeout).await {
        RowOutcome::Failed { error, .. } => assert!(matches!(error, Error::Http { status: 404, .. })),
        other => panic!("unexpected outcome: {other:?}"),
    }
}

#[tokio::test]
async fn pipeline_continues_past_failures_and_keeps_order() {
    let server = MockServer::start().await;
    mount_detail(&server, "0100100100", "CÔNG TY A").await;
    mount_detail(&server, "0305029405", "CÔNG TY B").await;

    let ids = ["0100100100", "", "0999999999", "0305029405"];
    let report = run_pipeline(&client_for(&server), &ids, &NO_DELAY).await.unwrap();
    let results = &report.results;

    let found: Vec<_> = results.iter().filter_map(|r| r.identifier()).collect();
    assert_eq!(found, vec!["0100100100", "0305029405"]);
    assert_eq!(results[1].display_name(), Some("0305029405 - CÔNG TY B"));
    assert_eq!(results[0].len(), 6);
    assert_eq!(report.failed, vec![(3, "0999999999".to_string())]);
}

#[tokio::test]
async fn blank_rows_are_neither_found_nor_failed() {
    let server = MockServer::start().await;
    mount_detail(&server, "0100100100", "CÔNG TY A").await;

    let ids = ["0100100100", "", "   ", "0999999999"];
    let report = run_pipeline(&client_for(&server), &ids, &NO_DELAY).await.unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(report.failed, vec![(4, "0999999999".to_string())]);
    assert_eq!(report.reported(), 2);
}

#[tokio::test]
async fn pipeline_without_any_success_fails() {
    let server = MockServer::start().await;

    let ids = ["0100100100", " "];
    let err = run_pipeline(&client_for(&server), &ids, &NO_DELAY).await.unwrap_err();
    assert!(matches!(err, Error::NoResults));
}

#[tokio::test]
async fn delay_follows_every_attempt_but_not_blank_rows() {
    let server = MockServer::start().await;
    mount_detail(&server, "0100100100", "CÔNG TY A").await;
    let options = PipelineOptions {
        delay: Duration::from_millis(150),
        ..NO_DELAY
    };

    let ids = ["0100100100", "", "", "0999999999"];
    let start = Instant::now();
    run_pipeline(&client_for(&server), &ids, &options).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(300));
}

#[tokio::test]
async fn enrich_file_left_joins_results_onto_the_input() {
    let server = MockServer::start().await;
    mount_detail(&server, "0100100100", "CÔNG TY A").await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("companies.csv");
    let output = dir.path().join("out/enriched.csv");
    fs::write(&input, "tax_id,note\n0100100100,a\n,b\n0305029405,c\n").unwrap();

    let job = EnrichJob {
        input,
        sheet: Sheet::default(),
        column: "tax_id".into(),
        output: output.clone(),
        options: NO_DELAY,
        lookup: LookupConfig::with_base_url(server.uri()),
    };
    let merged = enrich_file(&job).await.unwrap();

    let written = read_table(&output, &Sheet::default()).unwrap();
    assert_eq!(written, merged);
    assert_eq!(written.len(), 3);
    assert_eq!(
        written.headers(),
        ["tax_id", "note", "masothue_url", "Tên doanh nghiệp", "Mã số thuế", "Tình trạng", "Địa chỉ"]
    );

    let rows = written.rows();
    assert_eq!(rows[0][..2], ["0100100100", "a"]);
    assert_eq!(rows[0][3], "0100100100 - CÔNG TY A");
    assert_eq!(rows[0][6], "Hà Nội");
    assert!(rows[0][2].starts_with(&server.uri()));
    for row in &rows[1..] {
        assert!(row[2..].iter().all(String::is_empty), "{row:?}");
    }
    assert_eq!(rows[1][..2], ["", "b"]);
    assert_eq!(rows[2][..2], ["0305029405", "c"]);
}

#[tokio::test]
async fn enrich_file_writes_nothing_on_fatal_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("companies.csv");
    let output = dir.path().join("enriched.csv");
    fs::write(&input, "mst,note\n0100100100,a\n").unwrap();

    let mut job = EnrichJob {
        input,
        sheet: Sheet::default(),
        column: "tax_id".into(),
        output: output.clone(),
        options: NO_DELAY,
        lookup: LookupConfig::with_base_url(server.uri()),
    };
    let err = enrich_file(&job).await.unwrap_err();
    assert!(matches!(err, Error::MissingColumn { .. }));
    assert!(!output.exists());

    job.column = "mst".into();
    job.lookup = LookupConfig::with_base_url("http://127.0.0.1:9");
    job.options.timeout = Duration::from_millis(500);
    let err = enrich_file(&job).await.unwrap_err();
    assert!(matches!(err, Error::NoResults));
    assert!(!output.exists());
}
