use landuse_client::{InMemoryBackend, LanduseClient, PollPolicy};
use landuse_core::{
    ClientConfig, Coordinate, IdKind, JobId, JobStatus, LanduseError, PatternId, Polygon, ScenarioId,
    SessionId, Transport,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

fn coords(pairs: &[(f64, f64)]) -> Vec<Coordinate> {
    pairs.iter().copied().map(Coordinate::from).collect()
}

fn parcel() -> Vec<Coordinate> {
    coords(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)])
}

fn client_on(backend: &Arc<InMemoryBackend>) -> LanduseClient {
    let transport: Arc<dyn Transport> = backend.clone();
    LanduseClient::with_transport(ClientConfig::default(), transport).unwrap()
}

fn fast_policy() -> PollPolicy {
    PollPolicy::new(Duration::from_millis(5), 400)
}

/// A backend seeded with session S, scenario S1 and pattern P1, and a client
/// that has already listed them.
async fn seeded() -> (Arc<InMemoryBackend>, LanduseClient) {
    let backend = Arc::new(InMemoryBackend::new());
    let stencil = Polygon::from_pairs(&[(0.0, 0.0), (0.0, 3.0), (3.0, 3.0), (3.0, 0.0)]).unwrap();
    backend.insert_scenario("S", "S1", "baseline", None).await;
    backend.insert_pattern("S", "P1", "suburb", &stencil).await;

    let client = client_on(&backend);
    let session = SessionId::new("S");
    client.scenarios().list_scenarios(&session).await.unwrap();
    client.patterns().list_patterns(&session).await.unwrap();
    (backend, client)
}

#[tokio::test]
async fn test_create_session_issues_fresh_ids() {
    let backend = Arc::new(InMemoryBackend::new());
    let client = client_on(&backend);

    let first = client.sessions().create_session().await.unwrap();
    let second = client.sessions().create_session().await.unwrap();
    assert_ne!(first.id, second.id);

    let fetched = client.sessions().get_session(&first.id).await.unwrap();
    assert_eq!(fetched.id, first.id);
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let backend = Arc::new(InMemoryBackend::new());
    let client = client_on(&backend);

    let err = client
        .sessions()
        .get_session(&SessionId::new("missing"))
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(matches!(err, LanduseError::NotFound { entity_type: "session", .. }));
}

#[tokio::test]
async fn test_listings_of_unknown_session_are_not_found() {
    let backend = Arc::new(InMemoryBackend::new());
    let client = client_on(&backend);
    let missing = SessionId::new("missing");

    let err = client.scenarios().list_scenarios(&missing).await.unwrap_err();
    assert!(matches!(err, LanduseError::NotFound { entity_type: "session", .. }));

    let err = client.patterns().list_patterns(&missing).await.unwrap_err();
    assert!(matches!(err, LanduseError::NotFound { entity_type: "session", .. }));
}

#[tokio::test]
async fn test_scenario_round_trip() {
    let backend = Arc::new(InMemoryBackend::new());
    let client = client_on(&backend);
    let session = client.sessions().create_session().await.unwrap();

    let id = client
        .scenarios()
        .create_scenario(&session.id, "Green belt", Some("more forest"))
        .await
        .unwrap();
    let scenario = client.scenarios().get_scenario(&id).await.unwrap();
    assert_eq!(scenario.id, id);
    assert_eq!(scenario.session_id, session.id);
    assert_eq!(scenario.name, "Green belt");
    assert_eq!(scenario.description.as_deref(), Some("more forest"));

    let listed = client.scenarios().list_scenarios(&session.id).await.unwrap();
    assert_eq!(listed, vec![scenario]);
}

#[tokio::test]
async fn test_empty_scenario_name_rejected_locally() {
    let backend = Arc::new(InMemoryBackend::new());
    let client = client_on(&backend);
    let session = client.sessions().create_session().await.unwrap();
    let before = backend.request_count();

    let err = client
        .scenarios()
        .create_scenario(&session.id, "   ", None)
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(backend.request_count(), before);
}

#[tokio::test]
async fn test_unknown_scenario_is_not_found() {
    let backend = Arc::new(InMemoryBackend::new());
    let client = client_on(&backend);

    let err = client
        .scenarios()
        .get_scenario(&ScenarioId::new("nope"))
        .await
        .unwrap_err();
    assert!(matches!(err, LanduseError::NotFound { entity_type: "scenario", .. }));
}

#[tokio::test]
async fn test_pattern_creation_yields_distinct_ids() {
    let backend = Arc::new(InMemoryBackend::new());
    let client = client_on(&backend);
    let session = client.sessions().create_session().await.unwrap();

    let a = client
        .patterns()
        .create_pattern(&session.id, &parcel(), "park")
        .await
        .unwrap();
    let b = client
        .patterns()
        .create_pattern(&session.id, &parcel(), "park")
        .await
        .unwrap();
    assert_ne!(a, b);

    let listed = client.patterns().list_patterns(&session.id).await.unwrap();
    let ids: BTreeSet<PatternId> = listed.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, BTreeSet::from([a, b]));
    assert!(listed.iter().all(|p| p.name == "park" && p.geometry.ring().len() == 4));
}

#[tokio::test]
async fn test_degenerate_pattern_rejected_locally() {
    let backend = Arc::new(InMemoryBackend::new());
    let client = client_on(&backend);
    let session = client.sessions().create_session().await.unwrap();
    let before = backend.request_count();

    let err = client
        .patterns()
        .create_pattern(&session.id, &coords(&[(0.0, 0.0), (1.0, 1.0)]), "line")
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(backend.request_count(), before);
}

#[tokio::test]
async fn test_lulc_codes_are_stable() {
    let backend = Arc::new(InMemoryBackend::new());
    let client = client_on(&backend);

    let first = client.lulc().codes().await.unwrap();
    let second = client.lulc().codes().await.unwrap();
    assert_eq!(first, second);

    let other = client_on(&backend).lulc().codes().await.unwrap();
    assert_eq!(*first, *other);
    assert_eq!(first.code("forest"), Some(41));
}

#[tokio::test]
async fn test_parcel_table_keys_are_registry_categories() {
    let backend = Arc::new(InMemoryBackend::new());
    let client = client_on(&backend);

    let registry = client.lulc().codes().await.unwrap();
    let table = client.lulc().table_for_parcel(&parcel()).await.unwrap();
    assert!(!table.is_empty());
    assert!(table.categories().all(|c| registry.contains_name(c)));
    assert!((table.total() - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_wallpaper_job_lifecycle() {
    let (backend, client) = seeded().await;
    let job_id = client
        .wallpaper()
        .submit(&parcel(), &PatternId::new("P1"), &ScenarioId::new("S1"))
        .await
        .unwrap();
    // Job ids are looked up by the backend, never by the local registry.
    assert_eq!(client.ids().count(IdKind::Job), 0);

    assert_eq!(client.jobs().status(&job_id).await.unwrap(), JobStatus::Queued);
    // Reading the status never moves the job.
    assert_eq!(client.jobs().status(&job_id).await.unwrap(), JobStatus::Queued);

    let err = client.jobs().result(&job_id).await.unwrap_err();
    assert!(err.is_precondition_failed());

    assert_eq!(backend.advance_job(&job_id).await, Some(JobStatus::Running));
    assert!(client.jobs().result(&job_id).await.unwrap_err().is_precondition_failed());
    assert_eq!(backend.advance_job(&job_id).await, Some(JobStatus::Succeeded));
    assert_eq!(backend.advance_job(&job_id).await, None);

    let table = client.jobs().result(&job_id).await.unwrap();
    let allowed = ["forest", "grass", "housing", "commercial", "orchard"];
    assert!(!table.is_empty());
    assert!(table.categories().all(|c| allowed.contains(&c)));
    assert!((table.total() - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_failed_job_has_no_result() {
    let (backend, client) = seeded().await;
    let job_id = client
        .wallpaper()
        .submit(&parcel(), &PatternId::new("P1"), &ScenarioId::new("S1"))
        .await
        .unwrap();

    assert!(backend.fail_job(&job_id).await);
    assert_eq!(client.jobs().status(&job_id).await.unwrap(), JobStatus::Failed);
    assert!(client.jobs().result(&job_id).await.unwrap_err().is_precondition_failed());
    assert_eq!(
        client.jobs().wait(&job_id, fast_policy()).await.unwrap(),
        JobStatus::Failed
    );
}

#[tokio::test]
async fn test_submit_with_two_points_sends_nothing() {
    let (backend, client) = seeded().await;
    let before = backend.request_count();

    let err = client
        .wallpaper()
        .submit(
            &coords(&[(0.0, 0.0), (1.0, 1.0)]),
            &PatternId::new("P1"),
            &ScenarioId::new("S1"),
        )
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(backend.request_count(), before);
}

#[tokio::test]
async fn test_submit_with_collinear_target_sends_nothing() {
    let (backend, client) = seeded().await;
    let before = backend.request_count();

    let err = client
        .wallpaper()
        .submit(
            &coords(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]),
            &PatternId::new("P1"),
            &ScenarioId::new("S1"),
        )
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(backend.request_count(), before);
}

#[tokio::test]
async fn test_submit_with_unissued_ids_sends_nothing() {
    let (backend, client) = seeded().await;
    let before = backend.request_count();

    let err = client
        .wallpaper()
        .submit(&parcel(), &PatternId::new("P404"), &ScenarioId::new("S1"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());

    let err = client
        .wallpaper()
        .submit(&parcel(), &PatternId::new("P1"), &ScenarioId::new("S404"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(backend.request_count(), before);
}

#[tokio::test]
async fn test_fill_paints_whole_parcel() {
    let (backend, client) = seeded().await;

    let job_id = client
        .wallpaper()
        .fill(&parcel(), "forest", &ScenarioId::new("S1"))
        .await
        .unwrap();
    assert_eq!(backend.complete_all().await, 1);

    let table = client.jobs().result(&job_id).await.unwrap();
    assert_eq!(table.len(), 1);
    assert_eq!(table.get("forest"), Some(1.0));
    assert_eq!(
        backend.job_history(&job_id).await.unwrap(),
        vec![JobStatus::Queued, JobStatus::Running, JobStatus::Succeeded]
    );
}

#[tokio::test]
async fn test_crop_reports_scenario_edits() {
    let (backend, client) = seeded().await;
    let scenario = ScenarioId::new("S1");

    client
        .wallpaper()
        .fill(&parcel(), "grass", &scenario)
        .await
        .unwrap();
    backend.complete_all().await;

    let crop = client.wallpaper().crop(&scenario).await.unwrap();
    let table = client
        .jobs()
        .wait_for_result(&crop, PollPolicy::new(Duration::from_millis(1), 1))
        .await;
    // Nothing works the job yet.
    assert!(matches!(table, Err(LanduseError::PollLimitExceeded { .. })));

    backend.complete_all().await;
    let table = client.jobs().result(&crop).await.unwrap();
    assert_eq!(table.get("grass"), Some(1.0));
}

#[tokio::test]
async fn test_crop_with_unissued_scenario_sends_nothing() {
    let (backend, client) = seeded().await;
    let before = backend.request_count();

    let err = client
        .wallpaper()
        .crop(&ScenarioId::new("S404"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(backend.request_count(), before);
}

#[tokio::test]
async fn test_job_listing() {
    let (backend, client) = seeded().await;
    assert!(client.jobs().list().await.unwrap().is_empty());

    let wallpaper = client
        .wallpaper()
        .submit(&parcel(), &PatternId::new("P1"), &ScenarioId::new("S1"))
        .await
        .unwrap();
    let fill = client
        .wallpaper()
        .fill(&parcel(), "orchard", &ScenarioId::new("S1"))
        .await
        .unwrap();
    backend.advance_job(&wallpaper).await;

    let jobs = client.jobs().list().await.unwrap();
    let ids: Vec<&JobId> = jobs.iter().map(|j| &j.id).collect();
    assert_eq!(ids, vec![&wallpaper, &fill]);
    assert_eq!(jobs[0].status, JobStatus::Running);
    assert_eq!(jobs[0].name.as_deref(), Some("wallpaper"));
    assert_eq!(jobs[1].status, JobStatus::Queued);
}

#[tokio::test]
async fn test_fill_with_unknown_class_rejected() {
    let (backend, client) = seeded().await;
    // Load the registry up front so the count below only covers the fill.
    client.lulc().codes().await.unwrap();
    let before = backend.request_count();

    let err = client
        .wallpaper()
        .fill(&parcel(), "lava", &ScenarioId::new("S1"))
        .await
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert_eq!(backend.request_count(), before);
}

#[tokio::test]
async fn test_wait_follows_background_worker() {
    let (backend, client) = seeded().await;
    let worker = backend.spawn_worker(Duration::from_millis(10));

    let job_id = client
        .wallpaper()
        .submit(&parcel(), &PatternId::new("P1"), &ScenarioId::new("S1"))
        .await
        .unwrap();
    let table = client
        .jobs()
        .wait_for_result(&job_id, fast_policy())
        .await
        .unwrap();
    assert!(!table.is_empty());

    let history = backend.job_history(&job_id).await.unwrap();
    assert_eq!(
        history,
        vec![JobStatus::Queued, JobStatus::Running, JobStatus::Succeeded]
    );
    assert!(history.windows(2).all(|step| step[0].can_transition_to(step[1])));

    worker.abort();
}

#[tokio::test]
async fn test_wait_gives_up_after_limit() {
    let (_backend, client) = seeded().await;
    let job_id = client
        .wallpaper()
        .submit(&parcel(), &PatternId::new("P1"), &ScenarioId::new("S1"))
        .await
        .unwrap();

    let err = client
        .jobs()
        .wait(&job_id, PollPolicy::new(Duration::from_millis(1), 3))
        .await
        .unwrap_err();
    assert!(matches!(err, LanduseError::PollLimitExceeded { attempts: 3, .. }));
}

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let backend = Arc::new(InMemoryBackend::new());
    let client = client_on(&backend);

    let err = client.jobs().status(&JobId::new("ghost")).await.unwrap_err();
    assert!(matches!(err, LanduseError::NotFound { entity_type: "job", .. }));
}
