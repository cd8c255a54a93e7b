//! Downloads the question bank and lays it out as `media/question_<id>/`.

use crate::error::{Error, Result};
use crate::export::QUESTION_FILE;
use crate::media::MediaDescriptor;
use crate::record::QuestionRecord;
use colored::Colorize;
use log::{debug, error, info, warn};
use regex::Regex;
use reqwest::blocking::Client;
use reqwest::Url;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

pub const DEFAULT_URL: &str = "https://etesty.md.gov.cz/ro/DLArea/Index?id=99";

static QUESTION_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"const\s+questionList\s*=\s*").expect("valid pattern"));

/// An asset referenced by a question, to be stored as `file_name`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaJob {
    pub url: String,
    pub file_name: String,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FetchReport {
    pub questions: usize,
    pub skipped_questions: usize,
    pub media_downloaded: usize,
    pub media_skipped: usize,
    pub media_failed: usize,
}

/// Pulls the `questionList` array literal out of the index page.
pub fn extract_question_list(html: &str) -> Result<Vec<Value>> {
    let start = QUESTION_LIST
        .find(html)
        .ok_or(Error::QuestionListNotFound)?
        .end();
    let mut stream = serde_json::Deserializer::from_str(&html[start..]).into_iter::<Vec<Value>>();
    match stream.next() {
        Some(Ok(list)) => Ok(list),
        Some(Err(source)) => Err(Error::Json {
            origin: "questionList".to_string(),
            source,
        }),
        None => Err(Error::QuestionListNotFound),
    }
}

/// Folder name for a question, or `None` if its id cannot name a folder.
pub fn question_dir_name(record: &QuestionRecord) -> Option<String> {
    let id = record.id_text();
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        return None;
    }
    Some(format!("question_{id}"))
}

/// Question media first, then each answer's, without duplicates.
pub fn media_jobs(record: &QuestionRecord) -> Vec<MediaJob> {
    let descriptors = record
        .media_content
        .iter()
        .chain(record.question_answers.iter().filter_map(|a| a.media_content.as_ref()));

    let mut jobs: Vec<MediaJob> = Vec::new();
    for descriptor in descriptors {
        let Some(job) = job_for(descriptor) else {
            continue;
        };
        match jobs.iter().find(|j| j.file_name == job.file_name) {
            None => jobs.push(job),
            Some(kept) if kept.url != job.url => warn!(
                "[Fetch] {} and {} both save as {:?}; keeping the first",
                kept.url, job.url, job.file_name
            ),
            Some(_) => {}
        }
    }
    jobs
}

fn job_for(descriptor: &MediaDescriptor) -> Option<MediaJob> {
    let url = descriptor.media_url.as_deref().filter(|u| !u.trim().is_empty())?;
    Some(MediaJob {
        url: url.trim().to_string(),
        file_name: descriptor.file_name()?,
    })
}

/// Writes the raw question object to `<media_root>/question_<id>/question.json`.
pub fn write_question(media_root: &Path, dir_name: &str, question: &Value) -> Result<PathBuf> {
    let dir = media_root.join(dir_name);
    fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
    let path = dir.join(QUESTION_FILE);
    let json = serde_json::to_string_pretty(question).map_err(|source| Error::Json {
        origin: path.display().to_string(),
        source,
    })?;
    fs::write(&path, json).map_err(|e| Error::io(&path, e))?;
    Ok(dir)
}

pub struct Fetcher {
    client: Client,
    page_url: Url,
}

impl Fetcher {
    pub fn new(url: &str) -> Result<Self> {
        let page_url = Url::parse(url).map_err(|_| Error::InvalidUrl(url.to_string()))?;
        let client = Client::builder()
            .user_agent(concat!("etesty-anki/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client, page_url })
    }

    pub fn fetch_page(&self) -> Result<String> {
        info!("[Fetch] Downloading {}...", self.page_url);
        let body = self
            .client
            .get(self.page_url.clone())
            .send()?
            .error_for_status()?
            .text()?;
        Ok(body)
    }

    /// Stores one asset in `dir`. Returns `false` if it was already there.
    pub fn download(&self, job: &MediaJob, dir: &Path) -> Result<bool> {
        let dest = dir.join(&job.file_name);
        if dest.exists() {
            debug!("[Fetch] {:?} already present", dest);
            return Ok(false);
        }
        let url = self
            .page_url
            .join(&job.url)
            .map_err(|_| Error::InvalidUrl(job.url.clone()))?;
        let bytes = self.client.get(url).send()?.error_for_status()?.bytes()?;
        fs::write(&dest, &bytes).map_err(|e| Error::io(&dest, e))?;
        debug!("[Fetch] Saved {:?} ({} bytes)", dest, bytes.len());
        Ok(true)
    }

    /// Fetches the page and persists every question with its media.
    pub fn run(&self, media_root: &Path) -> Result<FetchReport> {
        let html = self.fetch_page()?;
        let questions = extract_question_list(&html)?;
        info!("[Fetch] Found {} questions", questions.len());
        fs::create_dir_all(media_root).map_err(|e| Error::io(media_root, e))?;

        let mut report = FetchReport::default();
        for question in &questions {
            let record = QuestionRecord::from_value(question.clone());
            let Some(dir_name) = question_dir_name(&record) else {
                warn!("[Fetch] Question without a usable `id`! Skipping...");
                report.skipped_questions += 1;
                continue;
            };
            let dir = write_question(media_root, &dir_name, question)?;
            report.questions += 1;

            for job in media_jobs(&record) {
                match self.download(&job, &dir) {
                    Ok(true) => report.media_downloaded += 1,
                    Ok(false) => report.media_skipped += 1,
                    Err(e) => {
                        error!("{}", format!("[Fetch] ✘ {} ({}): {}", job.file_name, job.url, e).red());
                        report.media_failed += 1;
                    }
                }
            }
            info!("[Fetch] ├ {}", dir_name);
        }

        Ok(report)
    }
}
