//! Shared fakes for gateway router tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use vibe_gateway::{Completion, Upstream, UpstreamError};

/// Scripted upstream that records every request
#[derive(Default)]
pub struct FakeUpstream {
    completion: Mutex<Option<Result<Option<String>, String>>>,
    audio: Mutex<Option<Result<Vec<u8>, String>>>,
    completions: Mutex<Vec<Completion>>,
    speech: Mutex<Vec<(String, String)>>,
}

impl FakeUpstream {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn reply(&self, content: Option<&str>) {
        *self.completion.lock().unwrap() = Some(Ok(content.map(str::to_string)));
    }

    pub fn fail_completion(&self, message: &str) {
        *self.completion.lock().unwrap() = Some(Err(message.to_string()));
    }

    pub fn audio(&self, bytes: &[u8]) {
        *self.audio.lock().unwrap() = Some(Ok(bytes.to_vec()));
    }

    pub fn fail_speech(&self, message: &str) {
        *self.audio.lock().unwrap() = Some(Err(message.to_string()));
    }

    pub fn completions(&self) -> Vec<Completion> {
        self.completions.lock().unwrap().clone()
    }

    /// (text, voice) pairs
    pub fn speech_calls(&self) -> Vec<(String, String)> {
        self.speech.lock().unwrap().clone()
    }
}

#[async_trait]
impl Upstream for FakeUpstream {
    async fn complete(&self, request: Completion) -> Result<Option<String>, UpstreamError> {
        self.completions.lock().unwrap().push(request);
        match self.completion.lock().unwrap().clone() {
            Some(Ok(content)) => Ok(content),
            Some(Err(message)) => Err(UpstreamError::Status(503, message)),
            None => Ok(None),
        }
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, UpstreamError> {
        self.speech
            .lock()
            .unwrap()
            .push((text.to_string(), voice.to_string()));
        match self.audio.lock().unwrap().clone() {
            Some(Ok(bytes)) => Ok(bytes),
            Some(Err(message)) => Err(UpstreamError::Network(message)),
            None => Ok(Vec::new()),
        }
    }
}
