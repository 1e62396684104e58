use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use klines_core::connector::{KlinesConnector, PageFetcher, PriceProvider};
use klines_core::{KlinesError, KlinesRequest, Page};

/// Instruction for how a call should behave.
#[derive(Clone)]
pub enum MockBehavior<T> {
    /// Return the provided value immediately.
    Return(T),
    /// Fail immediately with the provided error.
    Fail(KlinesError),
    /// Hang indefinitely (simulate a stalled request).
    Hang,
}

#[derive(Default)]
struct InternalState {
    pages: VecDeque<MockBehavior<Page>>,
    price: Option<MockBehavior<f64>>,
    requests: Vec<KlinesRequest>,
}

/// Controller handle used by tests to drive a [`ScriptedConnector`] from the outside.
pub struct ScriptedController {
    state: Arc<Mutex<InternalState>>,
}

impl ScriptedController {
    /// Queue the outcome of the next unanswered page request.
    pub async fn push_page(&self, behavior: MockBehavior<Page>) {
        self.state.lock().await.pages.push_back(behavior);
    }

    /// Queue several pages, answered in order.
    pub async fn push_pages(&self, pages: impl IntoIterator<Item = Page>) {
        let mut guard = self.state.lock().await;
        guard
            .pages
            .extend(pages.into_iter().map(MockBehavior::Return));
    }

    /// Set the behavior for `current_price` calls.
    pub async fn set_price_behavior(&self, behavior: MockBehavior<f64>) {
        self.state.lock().await.price = Some(behavior);
    }

    /// Page requests received so far, in order.
    pub async fn requests(&self) -> Vec<KlinesRequest> {
        self.state.lock().await.requests.clone()
    }

    /// Scripted pages not yet consumed.
    pub async fn pending(&self) -> usize {
        self.state.lock().await.pages.len()
    }

    /// Clear all scripted behaviors and the request log.
    pub async fn clear_all_behaviors(&self) {
        let mut guard = self.state.lock().await;
        guard.pages.clear();
        guard.price = None;
        guard.requests.clear();
    }
}

/// A connector that replays scripted pages regardless of the request bounds.
///
/// Once the script runs out every further page is empty, which ends pagination.
pub struct ScriptedConnector {
    name: &'static str,
    state: Arc<Mutex<InternalState>>,
}

impl ScriptedConnector {
    /// Create a new scripted connector and its controller.
    #[must_use]
    pub fn new_with_controller(name: &'static str) -> (Arc<Self>, ScriptedController) {
        let state = Arc::new(Mutex::new(InternalState::default()));
        let controller = ScriptedController {
            state: Arc::clone(&state),
        };
        (Arc::new(Self { name, state }), controller)
    }
}

impl KlinesConnector for ScriptedConnector {
    fn name(&self) -> &'static str {
        self.name
    }

    fn vendor(&self) -> &'static str {
        "ScriptedMock"
    }

    fn as_page_fetcher(&self) -> Option<&dyn PageFetcher> {
        Some(self as &dyn PageFetcher)
    }

    fn as_price_provider(&self) -> Option<&dyn PriceProvider> {
        Some(self as &dyn PriceProvider)
    }
}

#[async_trait]
impl PageFetcher for ScriptedConnector {
    async fn fetch_page(&self, req: KlinesRequest) -> Result<Page, KlinesError> {
        // Take the behavior without holding the lock across the hang.
        let behavior = {
            let mut guard = self.state.lock().await;
            guard.requests.push(req);
            guard.pages.pop_front()
        };

        match behavior {
            Some(MockBehavior::Return(page)) => Ok(page),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Ok(Page::default()),
        }
    }
}

#[async_trait]
impl PriceProvider for ScriptedConnector {
    async fn current_price(&self, _pair: &str) -> Result<f64, KlinesError> {
        let behavior = self.state.lock().await.price.clone();
        match behavior {
            Some(MockBehavior::Return(p)) => Ok(p),
            Some(MockBehavior::Fail(e)) => Err(e),
            Some(MockBehavior::Hang) => {
                std::future::pending::<()>().await;
                unreachable!()
            }
            None => Err(KlinesError::unsupported("current_price")),
        }
    }
}
