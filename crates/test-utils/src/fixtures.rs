//! Common test fixtures for harvester tests.
//!
//! Regions are plain tuples so this crate stays independent of the types
//! under test.

/// Named regions as `(name, top_left, bottom_right)`.
pub mod regions {
    pub type RegionFixture = (&'static str, (f64, f64), (f64, f64));

    /// East-west street segment, walked westward.
    pub const CESAR_CHAVEZ: RegionFixture = (
        "2010 Cesar Chavez St",
        (37.7496673, -122.3972457),
        (37.7495168, -122.4028567),
    );

    /// Mostly north-south segment, walked northward.
    pub const BARNEVELD_AVE: RegionFixture = (
        "255 Barneveld Ave",
        (37.7442872, -122.4031137),
        (37.7463507, -122.4025866),
    );

    /// Name containing characters that must be stripped from directories.
    pub const EVANS_AVE_ALT: RegionFixture = (
        "1938 Evans Ave(2)",
        (37.7463403, -122.3943565),
        (37.7441226, -122.390377),
    );

    /// Both corners identical.
    pub const DEGENERATE: RegionFixture = ("Single Spot", (37.75, -122.4), (37.75, -122.4));
}

/// Metadata endpoint response bodies.
pub mod metadata {
    pub const OK: &str = r#"{
        "copyright": "© Google",
        "date": "2019-06",
        "location": { "lat": 37.74966, "lng": -122.39724 },
        "pano_id": "CAoSLEFGMVFpcE1_abc-DEF",
        "status": "OK"
    }"#;

    /// OK response whose fields try to escape the output directory.
    pub const OK_HOSTILE: &str = r#"{
        "date": "../../etc",
        "pano_id": "a/b\\c:d",
        "status": "OK"
    }"#;

    /// OK response without pano id or date.
    pub const OK_SPARSE: &str = r#"{ "status": "OK" }"#;

    pub const ZERO_RESULTS: &str = r#"{ "status": "ZERO_RESULTS" }"#;

    pub const NOT_FOUND: &str = r#"{ "status": "NOT_FOUND" }"#;

    pub const OVER_QUERY_LIMIT: &str = r#"{
        "status": "OVER_QUERY_LIMIT",
        "error_message": "You have exceeded your rate-limit for this API."
    }"#;

    pub const REQUEST_DENIED: &str = r#"{
        "status": "REQUEST_DENIED",
        "error_message": "The provided API key is invalid."
    }"#;

    pub const MALFORMED: &str = r#"{ "status": "OK", "pano_id": "#;
}

/// Region configuration files.
pub mod config {
    pub const MINIMAL_YAML: &str = r#"
regions:
  - name: 2010 Cesar Chavez St
    top_left: [37.7496673, -122.3972457]
    bottom_right: [37.7495168, -122.4028567]
"#;

    pub const FULL_YAML: &str = r#"
output_dir: /data/streetview
sampling:
  num_points_major: 20
  sample_interval: 3
imagery:
  endpoint: http://localhost:9999/streetview
  size: 320x320
  pitch: 10
  source: default
  timeout_secs: 5
pacing:
  requests_per_second: 2.5
  burst: 4
  max_backoff_secs: 30
regions:
  - name: Central Fwy 2
    top_left: [37.7695034, -122.4113093]
    bottom_right: [37.769882, -122.4215653]
    enabled: false
  - name: 19th Street
    top_left: [37.7667, -122.4167]
    bottom_right: [37.7667, -122.4100]
"#;
}

/// Bytes standing in for a JPEG body (SOI and EOI markers only).
pub const JPEG_STUB: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0xFF, 0xD9];
