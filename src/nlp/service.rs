//! Serialized access to the toxicity model.
//!
//! Exactly one model instance exists per process; loading one per task is
//! prohibitively expensive, and concurrent calls into a device-resident
//! model compete for the same memory. A dedicated service thread owns the
//! model and workers address it over a channel, which serializes every
//! prediction without any polling.
//!
//! Every call is bounded by a reply timeout. A timeout is a per-post
//! scoring failure (the caller falls back to the neutral score), never a
//! shard failure.
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender};
use log::debug;

use super::toxicity::ToxicityModel;
use crate::error::Error;

enum Request {
    Predict {
        text: String,
        reply: Sender<Result<f32, Error>>,
    },
}

/// Cheap, cloneable handle used by workers.
#[derive(Clone)]
pub struct ScoreClient {
    requests: Sender<Request>,
    timeout: Duration,
}

impl ScoreClient {
    pub fn predict(&self, text: &str) -> Result<f32, Error> {
        let (reply, response): (_, Receiver<Result<f32, Error>>) = bounded(1);
        self.requests
            .send(Request::Predict {
                text: text.to_string(),
                reply,
            })
            .map_err(|_| Error::Custom("scoring service is gone".to_string()))?;
        self.response(&response)
    }

    fn response(&self, response: &Receiver<Result<f32, Error>>) -> Result<f32, Error> {
        match response.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(_) => Err(Error::Custom(format!(
                "no scoring reply within {:?}",
                self.timeout
            ))),
        }
    }
}

/// The service thread. Runs until every [ScoreClient] is dropped.
pub struct ScoreService {
    handle: JoinHandle<()>,
}

impl ScoreService {
    pub fn spawn(
        model: Box<dyn ToxicityModel>,
        timeout: Duration,
    ) -> (ScoreService, ScoreClient) {
        let (requests, inbox) = unbounded::<Request>();
        let handle = thread::spawn(move || {
            let mut served = 0usize;
            for request in inbox {
                match request {
                    Request::Predict { text, reply } => {
                        // a closed reply channel means the caller timed out,
                        // nothing left to do for that post
                        let _ = reply.send(model.predict(&text));
                        served += 1;
                    }
                }
            }
            debug!("scoring service done, {} prediction(s) served", served);
        });

        (
            ScoreService { handle },
            ScoreClient { requests, timeout },
        )
    }

    /// Wait for the service thread to exit. Call after dropping every
    /// client, otherwise this blocks forever.
    pub fn join(self) -> Result<(), Error> {
        self.handle
            .join()
            .map_err(|_| Error::Custom("scoring service panicked".to_string()))
    }
}
