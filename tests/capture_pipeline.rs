//! End-to-end capture tests driving the real feed client against file://
//! fixtures and a scratch SQLite database.

use chrono::{Duration, TimeZone, Utc};
use pretty_assertions::assert_eq;
use std::path::Path;

use tender_capture::capture::CaptureService;
use tender_capture::feed::PlacspClient;
use tender_capture::models::{Config, CAPTURE_CHECKPOINT_KEY};
use tender_capture::store::{CheckpointStore, RawTenderStore};

fn fixture_config(dir: &tempfile::TempDir, payload_file: &Path) -> Config {
    Config {
        database_path: dir.path().join("capture.db").to_string_lossy().into_owned(),
        source_url: format!("file://{}", payload_file.display()),
        source_name: "placsp".to_string(),
        timeout_seconds: 5,
        overlap_minutes: 120,
    }
}

fn build_service(
    config: &Config,
) -> (
    CaptureService<PlacspClient>,
    RawTenderStore,
    CheckpointStore,
) {
    let client = PlacspClient::new(config).expect("failed to build feed client");
    let tenders = RawTenderStore::new(&config.database_path).expect("failed to open record store");
    let checkpoints =
        CheckpointStore::new(&config.database_path).expect("failed to open checkpoint store");
    let service = CaptureService::new(
        client,
        tenders.clone(),
        checkpoints.clone(),
        config.overlap_minutes,
    );
    (service, tenders, checkpoints)
}

const JSON_FIXTURE: &str = r#"{
  "items": [
    {
      "external_id": "exp-001",
      "title": "Contrato 1",
      "summary": "Resumen",
      "link": "https://example.org/1",
      "published_at": "2026-01-01T12:00:00+00:00"
    }
  ]
}"#;

#[tokio::test]
async fn test_pipeline_is_idempotent_by_external_id_and_source() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("data.json");
    std::fs::write(&payload, JSON_FIXTURE).unwrap();

    let config = fixture_config(&dir, &payload);
    let (service, tenders, _) = build_service(&config);

    let first = service.run().await.unwrap();
    let second = service.run().await.unwrap();

    assert_eq!(first.fetched, 1);
    assert_eq!(first.inserted, 1);
    assert_eq!(second.fetched, 1);
    assert_eq!(second.inserted, 0);
    assert_eq!(tenders.count_all().unwrap(), 1);
}

#[tokio::test]
async fn test_checkpoint_is_written_on_success() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("data.json");
    std::fs::write(&payload, JSON_FIXTURE).unwrap();

    let config = fixture_config(&dir, &payload);
    let (service, _, checkpoints) = build_service(&config);

    let result = service.run().await.unwrap();

    let stored = checkpoints.get(CAPTURE_CHECKPOINT_KEY).unwrap().unwrap();
    assert_eq!(stored.value, result.new_checkpoint);
}

#[tokio::test]
async fn test_overlap_window_is_applied_to_seeded_checkpoint() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("data.json");
    std::fs::write(&payload, JSON_FIXTURE).unwrap();

    let mut config = fixture_config(&dir, &payload);
    config.overlap_minutes = 30;
    let (service, _, checkpoints) = build_service(&config);

    let previous = Utc.with_ymd_and_hms(2026, 1, 2, 8, 0, 0).unwrap();
    checkpoints.set(CAPTURE_CHECKPOINT_KEY, previous).unwrap();

    let result = service.run().await.unwrap();

    assert_eq!(result.previous_checkpoint, Some(previous));
    assert_eq!(result.effective_since, Some(previous - Duration::minutes(30)));
    assert_eq!(
        result.effective_since,
        Some(Utc.with_ymd_and_hms(2026, 1, 2, 7, 30, 0).unwrap())
    );
}

#[tokio::test]
async fn test_atom_payload_end_to_end_with_business_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("feed.xml");
    std::fs::write(
        &payload,
        r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:cbc="urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2">
  <entry>
    <id>exp-atom-001</id>
    <title>Contrato Atom</title>
    <summary>Resumen atom</summary>
    <updated>2026-01-10T09:00:00Z</updated>
    <link href="https://example.org/atom/1" />
    <cbc:DeadlineDate>2026-02-10T12:00:00Z</cbc:DeadlineDate>
    <cbc:PartyName>Ayuntamiento de Madrid</cbc:PartyName>
    <cbc:NUTSCode>ES300</cbc:NUTSCode>
    <cbc:ItemClassificationCode>79341000</cbc:ItemClassificationCode>
    <cbc:TotalAmount>125000,50</cbc:TotalAmount>
  </entry>
</feed>
"#,
    )
    .unwrap();

    let config = fixture_config(&dir, &payload);
    let (service, tenders, _) = build_service(&config);

    let result = service.run().await.unwrap();

    assert_eq!(result.fetched, 1);
    assert_eq!(result.inserted, 1);
    assert_eq!(tenders.count_all().unwrap(), 1);
}

#[tokio::test]
async fn test_failed_fetch_leaves_checkpoint_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let payload = dir.path().join("missing.json"); // never written

    let mut config = fixture_config(&dir, &payload);
    config.overlap_minutes = 0;
    let (service, tenders, checkpoints) = build_service(&config);

    let previous = Utc.with_ymd_and_hms(2026, 1, 2, 8, 0, 0).unwrap();
    checkpoints.set(CAPTURE_CHECKPOINT_KEY, previous).unwrap();

    let result = service.run().await;

    assert!(result.is_err());
    let stored = checkpoints.get(CAPTURE_CHECKPOINT_KEY).unwrap().unwrap();
    assert_eq!(stored.value, previous);
    assert_eq!(tenders.count_all().unwrap(), 0);
}

#[tokio::test]
async fn test_records_merge_across_json_and_atom_runs() {
    let dir = tempfile::tempdir().unwrap();

    let json_payload = dir.path().join("data.json");
    std::fs::write(&json_payload, JSON_FIXTURE).unwrap();

    let xml_payload = dir.path().join("feed.xml");
    std::fs::write(
        &xml_payload,
        r#"<feed xmlns="http://www.w3.org/2005/Atom">
  <entry>
    <id>exp-atom-002</id>
    <title>Otro contrato</title>
    <updated>2026-01-11T09:00:00Z</updated>
  </entry>
</feed>"#,
    )
    .unwrap();

    let json_config = fixture_config(&dir, &json_payload);
    let (json_service, tenders, _) = build_service(&json_config);
    json_service.run().await.unwrap();

    let xml_config = fixture_config(&dir, &xml_payload);
    let (xml_service, _, _) = build_service(&xml_config);
    let result = xml_service.run().await.unwrap();

    assert_eq!(result.inserted, 1);
    assert_eq!(tenders.count_all().unwrap(), 2);
}
