//! Region-by-region imagery harvesting.
//!
//! For each region the harvester creates the output directory, plans the
//! grid, then fetches every (point, heading) pair in order. A failing request
//! is logged and counted; it never stops the region.

use std::path::{Path, PathBuf};

use streetview_common::{image_file_name, Region, HEADINGS};
use tokio::fs;
use tracing::{error, info, instrument, warn};

use crate::client::{ImageRequest, ImageryClient};
use crate::config::{PacingConfig, SamplingConfig};
use crate::error::{FetchError, FetchResult, HarvestError};
use crate::pacing::RequestPacer;

/// What happened to one (point, heading) request.
#[derive(Debug)]
pub enum RequestOutcome {
    Downloaded { path: PathBuf, bytes: usize },
    Unavailable,
    Failed(FetchError),
}

/// Per-region counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionReport {
    pub region: String,
    pub output_dir: PathBuf,
    pub points: usize,
    pub downloaded: usize,
    pub unavailable: usize,
    pub failed: usize,
    pub rate_limited: usize,
    /// The grid was empty, so nothing was requested
    pub skipped: bool,
}

impl RegionReport {
    fn new(region: &Region, output_dir: PathBuf) -> Self {
        Self {
            region: region.name.clone(),
            output_dir,
            ..Self::default()
        }
    }

    pub fn record(&mut self, outcome: &RequestOutcome) {
        match outcome {
            RequestOutcome::Downloaded { .. } => self.downloaded += 1,
            RequestOutcome::Unavailable => self.unavailable += 1,
            RequestOutcome::Failed(e) => {
                self.failed += 1;
                if matches!(e, FetchError::RateLimited { .. }) {
                    self.rate_limited += 1;
                }
            }
        }
    }

    /// Requests issued for this region.
    pub fn attempted(&self) -> usize {
        self.downloaded + self.unavailable + self.failed
    }
}

/// Drives the sequential fetch loop over configured regions.
pub struct Harvester<C> {
    client: C,
    output_dir: PathBuf,
    sampling: SamplingConfig,
    pacer: RequestPacer,
}

impl<C: ImageryClient> Harvester<C> {
    pub fn new(
        client: C,
        output_dir: impl Into<PathBuf>,
        sampling: SamplingConfig,
        pacing: &PacingConfig,
    ) -> Self {
        Self {
            client,
            output_dir: output_dir.into(),
            sampling,
            pacer: RequestPacer::new(pacing),
        }
    }

    /// Harvest every region in order.
    ///
    /// A region that cannot be set up is logged and left out of the returned
    /// reports; the remaining regions still run.
    pub async fn run(&mut self, regions: &[Region]) -> Vec<RegionReport> {
        let mut reports = Vec::with_capacity(regions.len());

        for region in regions {
            match self.harvest_region(region).await {
                Ok(report) => reports.push(report),
                Err(e) => error!(region = %region.name, error = %e, "Region failed"),
            }
        }

        reports
    }

    /// Harvest a single region.
    #[instrument(skip(self, region), fields(region = %region.name))]
    pub async fn harvest_region(&mut self, region: &Region) -> Result<RegionReport, HarvestError> {
        let plan = region
            .plan(self.sampling.num_points_major, self.sampling.sample_interval)
            .map_err(|source| HarvestError::Grid {
                region: region.name.clone(),
                source,
            })?;

        let dir = self.output_dir.join(&plan.folder_name);
        fs::create_dir_all(&dir)
            .await
            .map_err(|source| HarvestError::OutputDir {
                path: dir.display().to_string(),
                source,
            })?;

        info!(
            top_left = %region.top_left,
            bottom_right = %region.bottom_right,
            output_dir = %dir.display(),
            sample_interval = self.sampling.sample_interval,
            "Processing region"
        );
        info!(
            points = plan.points.len(),
            axis = %plan.spec.major_axis,
            "Generated grid points"
        );

        let mut report = RegionReport::new(region, dir.clone());
        report.points = plan.points.len();

        if plan.points.is_empty() {
            warn!("No grid points generated, check region coordinates");
            report.skipped = true;
            return Ok(report);
        }

        for point in &plan.points {
            for heading in HEADINGS {
                let request = ImageRequest {
                    point: *point,
                    heading,
                };

                self.pacer.wait().await;
                let outcome = self
                    .fetch_image(&dir, &request)
                    .await
                    .unwrap_or_else(RequestOutcome::Failed);

                self.log_outcome(&request, &outcome);
                self.feed_pacer(&outcome);
                report.record(&outcome);
            }
        }

        info!(
            downloaded = report.downloaded,
            unavailable = report.unavailable,
            failed = report.failed,
            rate_limited = report.rate_limited,
            "Completed region"
        );

        Ok(report)
    }

    /// Look up, download and store one image.
    async fn fetch_image(&self, dir: &Path, request: &ImageRequest) -> FetchResult<RequestOutcome> {
        let lookup = self.client.lookup(request).await?;

        let Some(link) = lookup.link.as_deref() else {
            return Ok(RequestOutcome::Unavailable);
        };

        let bytes = self.client.download(link).await?;
        let file_name = image_file_name(
            lookup.metadata.pano_id.as_deref(),
            lookup.metadata.date.as_deref(),
            request.point,
            request.heading,
        );
        let path = dir.join(file_name);
        write_atomic(&path, &bytes).await?;

        Ok(RequestOutcome::Downloaded {
            path,
            bytes: bytes.len(),
        })
    }

    fn log_outcome(&self, request: &ImageRequest, outcome: &RequestOutcome) {
        let lat = request.point.lat;
        let lon = request.point.lon;
        let heading = request.heading.degrees();

        match outcome {
            RequestOutcome::Downloaded { path, bytes } => info!(
                lat,
                lon,
                heading,
                bytes = *bytes,
                file = %path.display(),
                "Downloaded image"
            ),
            RequestOutcome::Unavailable => info!(lat, lon, heading, "No image available"),
            RequestOutcome::Failed(e) => warn!(
                lat,
                lon,
                heading,
                kind = e.kind(),
                error = %e,
                "Failed to download image"
            ),
        }
    }

    fn feed_pacer(&mut self, outcome: &RequestOutcome) {
        match outcome {
            RequestOutcome::Downloaded { .. } | RequestOutcome::Unavailable => {
                self.pacer.record_success()
            }
            RequestOutcome::Failed(e) => {
                if let Some(retry_after) = e.throttle_hint() {
                    self.pacer.record_throttled(retry_after);
                }
            }
        }
    }
}

/// Write to a `.partial` sibling, then rename into place.
async fn write_atomic(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut partial = path.as_os_str().to_owned();
    partial.push(".partial");
    let partial = PathBuf::from(partial);

    let result = async {
        fs::write(&partial, bytes).await?;
        fs::rename(&partial, path).await
    }
    .await;

    if result.is_err() {
        fs::remove_file(&partial).await.ok();
    }
    result
}

/// Log what a run would do without touching the API or the filesystem.
pub fn log_plans(regions: &[Region], sampling: &SamplingConfig, output_dir: &Path) {
    for region in regions {
        match region.plan(sampling.num_points_major, sampling.sample_interval) {
            Ok(plan) => {
                let first = plan.points.first().map(|p| p.to_string()).unwrap_or_default();
                let last = plan.points.last().map(|p| p.to_string()).unwrap_or_default();
                info!(
                    region = %region.name,
                    output_dir = %output_dir.join(&plan.folder_name).display(),
                    axis = %plan.spec.major_axis,
                    lat_step = plan.spec.lat_step,
                    lon_step = plan.spec.lon_step,
                    points = plan.points.len(),
                    requests = plan.points.len() * HEADINGS.len(),
                    first = %first,
                    last = %last,
                    "Planned region"
                );
            }
            Err(e) => error!(region = %region.name, error = %e, "Invalid region"),
        }
    }
}
