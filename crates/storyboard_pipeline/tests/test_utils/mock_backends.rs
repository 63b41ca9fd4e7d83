//! Scripted text and image backends.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use storyboard_core::{GenerateRequest, GenerateResponse, ImageRequest, Output, RenderedImage};
use storyboard_error::{BackendError, BackendErrorKind, StoryboardResult};
use storyboard_interface::{ImageBackend, TextBackend};
use tokio_util::sync::CancellationToken;

/// Tag embedded in a scene description so mocks can recover its index.
pub fn scene_marker(index: usize) -> String {
    format!("[scene-{}]", index)
}

fn index_from_prompt(prompt: &str) -> Option<usize> {
    let start = prompt.find("[scene-")? + "[scene-".len();
    let end = start + prompt[start..].find(']')?;
    prompt[start..end].parse().ok()
}

/// One scripted text backend reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// Answer with this text
    Text(String),
    /// Fail with this error
    Error(BackendErrorKind),
    /// Sleep before answering with this text
    Slow(Duration, String),
}

/// Text backend that replays a script, repeating the last entry.
#[derive(Clone)]
pub struct MockTextBackend {
    script: Arc<Vec<MockReply>>,
    calls: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl MockTextBackend {
    /// Always answer with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::scripted(vec![MockReply::Text(text.into())])
    }

    /// Always fail with `kind`.
    pub fn failing(kind: BackendErrorKind) -> Self {
        Self::scripted(vec![MockReply::Error(kind)])
    }

    /// Replay `script` in order.
    pub fn scripted(script: Vec<MockReply>) -> Self {
        assert!(!script.is_empty(), "mock script must not be empty");
        Self {
            script: Arc::new(script),
            calls: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Number of generate() calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextBackend for MockTextBackend {
    async fn generate(&self, req: &GenerateRequest) -> StoryboardResult<GenerateResponse> {
        self.requests.lock().unwrap().push(req.clone());
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.script[call.min(self.script.len() - 1)].clone();

        let text = match reply {
            MockReply::Text(text) => text,
            MockReply::Error(kind) => return Err(BackendError::new(kind).into()),
            MockReply::Slow(delay, text) => {
                tokio::time::sleep(delay).await;
                text
            }
        };

        Ok(GenerateResponse {
            outputs: vec![Output::Text(text)],
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-text-v1"
    }
}

#[derive(Default)]
struct ImageScript {
    always_fail: HashMap<usize, BackendErrorKind>,
    fail_once: HashMap<usize, BackendErrorKind>,
    empty_body: HashSet<usize>,
    cancel_at: Option<(usize, CancellationToken)>,
    delay: Option<Duration>,
}

/// Image backend scripted per scene index.
///
/// The index is read from the [`scene_marker`] in the prompt. Unscripted
/// scenes succeed with a tiny PNG-tagged payload ending in the index.
#[derive(Clone, Default)]
pub struct MockImageBackend {
    script: Arc<Mutex<ImageScript>>,
    calls: Arc<AtomicUsize>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<ImageRequest>>>,
}

impl MockImageBackend {
    /// Every scene succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scene `index` always fails with `kind`.
    pub fn failing(self, index: usize, kind: BackendErrorKind) -> Self {
        self.script.lock().unwrap().always_fail.insert(index, kind);
        self
    }

    /// Scene `index` fails on its first attempt only.
    pub fn failing_once(self, index: usize, kind: BackendErrorKind) -> Self {
        self.script.lock().unwrap().fail_once.insert(index, kind);
        self
    }

    /// Scene `index` comes back with no bytes.
    pub fn empty_body(self, index: usize) -> Self {
        self.script.lock().unwrap().empty_body.insert(index);
        self
    }

    /// Cancel `token` while scene `index` is rendering.
    pub fn cancelling_at(self, index: usize, token: CancellationToken) -> Self {
        self.script.lock().unwrap().cancel_at = Some((index, token));
        self
    }

    /// Sleep for `delay` in every call.
    pub fn with_delay(self, delay: Duration) -> Self {
        self.script.lock().unwrap().delay = Some(delay);
        self
    }

    /// Number of render() calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Most renders ever in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    /// Every request received, in order.
    pub fn requests(&self) -> Vec<ImageRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Scene indices rendered, in call order.
    pub fn rendered_indices(&self) -> Vec<usize> {
        self.requests()
            .iter()
            .filter_map(|r| index_from_prompt(r.prompt()))
            .collect()
    }

    /// Bytes a successful render of `index` returns.
    pub fn image_for(index: usize) -> Vec<u8> {
        let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        data.push(index as u8);
        data
    }
}

#[async_trait]
impl ImageBackend for MockImageBackend {
    async fn render(&self, req: &ImageRequest) -> StoryboardResult<RenderedImage> {
        self.requests.lock().unwrap().push(req.clone());
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let index = index_from_prompt(req.prompt()).unwrap_or(usize::MAX);
        let (failure, empty, delay) = {
            let mut script = self.script.lock().unwrap();
            if let Some((at, token)) = &script.cancel_at {
                if *at == index {
                    token.cancel();
                }
            }
            let failure = script
                .always_fail
                .get(&index)
                .cloned()
                .or_else(|| script.fail_once.remove(&index));
            (failure, script.empty_body.contains(&index), script.delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(kind) = failure {
            return Err(BackendError::new(kind).into());
        }
        if empty {
            return Ok(RenderedImage::new(Vec::new(), None));
        }
        Ok(RenderedImage::new(
            Self::image_for(index),
            Some("image/png".to_string()),
        ))
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-image-v1"
    }
}
