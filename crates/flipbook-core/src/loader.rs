//! Progressive page loader
//!
//! A single actor task owns the document handle, the page slots, the render
//! cache and the generation counter. Work happens in spawned pass tasks that
//! report back over an internal channel, so every state change is applied by
//! the actor in message order:
//! 1. Open the document on a blocking thread and allocate pending slots
//! 2. Render the prefix one page at a time, then announce readiness
//! 3. Render the remaining pages with bounded concurrency
//! 4. On zoom change, re-render every page and announce readiness once all settle

use crate::cache::{CacheKey, RenderCache};
use crate::messages::*;
use crate::options::ViewerOptions;
use crate::slots::{PageSlot, PageSlots};
use crate::source::{DocumentSource, PageSource};
use crate::types::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Loader settings taken from the viewer options
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderConfig {
    pub initial_pages_to_load: usize,
    pub max_concurrent_renders: usize,
    pub cache_enabled: bool,
    pub cache_capacity: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        LoaderConfig::from(&ViewerOptions::default())
    }
}

impl From<&ViewerOptions> for LoaderConfig {
    fn from(options: &ViewerOptions) -> Self {
        Self {
            initial_pages_to_load: options.initial_pages_to_load,
            max_concurrent_renders: options.max_concurrent_renders,
            cache_enabled: options.cache_enabled,
            cache_capacity: options.cache_capacity,
        }
    }
}

/// Sending side of the loader's command channel.
///
/// Every command gets a ticket from a counter shared by all clones; the
/// loader echoes it in [`LoaderEvent::Accepted`] once the command is handled.
#[derive(Debug, Clone)]
pub struct LoaderHandle {
    command_tx: mpsc::UnboundedSender<LoaderCommand>,
    tickets: Arc<AtomicU64>,
}

impl LoaderHandle {
    pub fn new(command_tx: mpsc::UnboundedSender<LoaderCommand>) -> Self {
        Self {
            command_tx,
            tickets: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn open(&self, reference: DocumentRef, zoom: ZoomLevel) -> Ticket {
        let ticket = self.next_ticket();
        self.send(LoaderCommand::Open {
            ticket,
            reference,
            zoom,
        });
        ticket
    }

    pub fn rescale(&self, zoom: ZoomLevel) -> Ticket {
        let ticket = self.next_ticket();
        self.send(LoaderCommand::Rescale { ticket, zoom });
        ticket
    }

    pub fn close(&self) -> Ticket {
        let ticket = self.next_ticket();
        self.send(LoaderCommand::Close { ticket });
        ticket
    }

    fn next_ticket(&self) -> Ticket {
        self.tickets.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn send(&self, command: LoaderCommand) {
        if self.command_tx.send(command).is_err() {
            log::warn!("Loader task has stopped; command dropped");
        }
    }
}

/// Spawn the loader actor on the current tokio runtime
pub fn spawn_loader<S: DocumentSource>(
    source: S,
    config: LoaderConfig,
) -> (LoaderHandle, mpsc::UnboundedReceiver<LoaderEvent>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();

    tokio::spawn(loader_task(source, config, command_rx, event_tx));

    (LoaderHandle::new(command_tx), event_rx)
}

/// Actor loop: processes commands and pass results until every handle is dropped
pub async fn loader_task<S: DocumentSource>(
    source: S,
    config: LoaderConfig,
    mut command_rx: mpsc::UnboundedReceiver<LoaderCommand>,
    event_tx: mpsc::UnboundedSender<LoaderEvent>,
) {
    let (job_tx, mut job_rx) = mpsc::unbounded_channel();
    let mut actor = LoaderActor::new(source, config, event_tx, job_tx);

    loop {
        tokio::select! {
            command = command_rx.recv() => match command {
                Some(command) => actor.handle_command(command),
                None => break,
            },
            Some(job) = job_rx.recv() => actor.handle_job(job),
        }
    }

    // Stop any pass still running
    actor.bump_generation();
    log::debug!("Loader task stopped");
}

/// Results reported by open and render tasks
enum Job<D> {
    Opened {
        generation: Generation,
        document: Arc<D>,
    },
    OpenFailed {
        generation: Generation,
        error: ViewerError,
    },
    Page {
        generation: Generation,
        index: usize,
        zoom: ZoomLevel,
        result: Result<RenderedPage>,
    },
    PrefixDone {
        generation: Generation,
    },
    PassDone {
        generation: Generation,
    },
}

struct LoaderActor<S: DocumentSource> {
    source: Arc<S>,
    config: LoaderConfig,
    generation: Arc<AtomicU64>,
    document: Option<Arc<S::Document>>,
    zoom: ZoomLevel,
    pass: Option<PassKind>,
    slots: PageSlots,
    cache: RenderCache,
    event_tx: mpsc::UnboundedSender<LoaderEvent>,
    job_tx: mpsc::UnboundedSender<Job<S::Document>>,
}

impl<S: DocumentSource> LoaderActor<S> {
    fn new(
        source: S,
        config: LoaderConfig,
        event_tx: mpsc::UnboundedSender<LoaderEvent>,
        job_tx: mpsc::UnboundedSender<Job<S::Document>>,
    ) -> Self {
        let cache = if config.cache_enabled {
            RenderCache::new(config.cache_capacity)
        } else {
            RenderCache::disabled()
        };

        Self {
            source: Arc::new(source),
            config,
            generation: Arc::new(AtomicU64::new(0)),
            document: None,
            zoom: ZoomLevel::default(),
            pass: None,
            slots: PageSlots::new(),
            cache,
            event_tx,
            job_tx,
        }
    }

    fn current_generation(&self) -> Generation {
        self.generation.load(Ordering::SeqCst)
    }

    fn bump_generation(&self) -> Generation {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: Generation) -> bool {
        generation == self.current_generation()
    }

    fn emit(&self, event: LoaderEvent) {
        // The viewer may already be gone; nothing left to notify
        let _ = self.event_tx.send(event);
    }

    fn handle_command(&mut self, command: LoaderCommand) {
        match command {
            LoaderCommand::Open {
                ticket,
                reference,
                zoom,
            } => self.open(ticket, reference, zoom),
            LoaderCommand::Rescale { ticket, zoom } => self.rescale(ticket, zoom),
            LoaderCommand::Close { ticket } => {
                let generation = self.bump_generation();
                self.clear_document();
                log::info!("Document closed");
                self.accept(ticket, generation);
                self.emit(LoaderEvent::Closed { generation });
            }
        }
    }

    fn accept(&self, ticket: Ticket, generation: Generation) {
        self.emit(LoaderEvent::Accepted { generation, ticket });
    }

    fn clear_document(&mut self) {
        self.document = None;
        self.pass = None;
        self.slots.reset();
        self.cache.clear();
    }

    fn open(&mut self, ticket: Ticket, reference: DocumentRef, zoom: ZoomLevel) {
        let generation = self.bump_generation();
        self.clear_document();
        self.zoom = zoom;

        log::info!("Opening {}", reference.display_name());
        self.accept(ticket, generation);
        self.emit(LoaderEvent::Opening { generation });

        let source = self.source.clone();
        let job_tx = self.job_tx.clone();
        tokio::spawn(async move {
            let opened = tokio::task::spawn_blocking(move || source.open(&reference)).await;
            let job = match opened {
                Ok(Ok(document)) => Job::Opened {
                    generation,
                    document: Arc::new(document),
                },
                Ok(Err(error)) => Job::OpenFailed { generation, error },
                Err(error) => Job::OpenFailed {
                    generation,
                    error: error.into(),
                },
            };
            let _ = job_tx.send(job);
        });
    }

    fn rescale(&mut self, ticket: Ticket, zoom: ZoomLevel) {
        if zoom == self.zoom {
            log::debug!("Zoom unchanged at {}", zoom);
            self.accept(ticket, self.current_generation());
            return;
        }
        self.zoom = zoom;

        if self.document.is_none() {
            // An open still in flight will render at the new zoom
            log::debug!("No document loaded; zoom {} applies to the next pass", zoom);
            self.accept(ticket, self.current_generation());
            return;
        }

        let generation = self.bump_generation();
        log::info!("Reloading all pages at {}", zoom);
        self.accept(ticket, generation);
        self.start_pass(PassKind::Reload, generation);
    }

    fn handle_job(&mut self, job: Job<S::Document>) {
        match job {
            Job::Opened {
                generation,
                document,
            } => {
                if !self.is_current(generation) {
                    log::debug!("Discarding superseded open (generation {})", generation);
                    return;
                }
                let page_count = document.page_count();
                self.slots.allocate(page_count);
                self.document = Some(document);
                self.emit(LoaderEvent::Opened {
                    generation,
                    page_count,
                });
                self.start_pass(PassKind::Initial, generation);
            }
            Job::OpenFailed { generation, error } => {
                if !self.is_current(generation) {
                    return;
                }
                log::error!("Failed to load PDF: {}", error);
                self.emit(LoaderEvent::OpenFailed {
                    generation,
                    message: error.to_string(),
                });
            }
            Job::Page {
                generation,
                index,
                zoom,
                result,
            } => {
                if !self.is_current(generation) {
                    log::debug!(
                        "Discarding page {} from superseded pass (generation {})",
                        index,
                        generation
                    );
                    return;
                }
                self.publish_page(generation, index, zoom, result);
            }
            Job::PrefixDone { generation } => {
                if self.is_current(generation) && self.pass == Some(PassKind::Initial) {
                    log::info!(
                        "First {} page(s) ready",
                        self.config.initial_pages_to_load.min(self.slots.len())
                    );
                    self.emit(LoaderEvent::Ready { generation });
                }
            }
            Job::PassDone { generation } => {
                if !self.is_current(generation) {
                    return;
                }
                self.finish_pass(generation);
            }
        }
    }

    fn publish_page(
        &mut self,
        generation: Generation,
        index: usize,
        zoom: ZoomLevel,
        result: Result<RenderedPage>,
    ) {
        match result {
            Ok(page) => {
                let page = Arc::new(page);
                self.cache.put(CacheKey::new(index, zoom), page.clone());
                self.slots.set(index, PageSlot::Ready(page.clone()));
                self.emit(LoaderEvent::PageRendered {
                    generation,
                    index,
                    page,
                });
            }
            Err(error) => {
                log::warn!("Error rendering page {}: {}", index + 1, error);
                let message = error.to_string();
                self.slots.set(index, PageSlot::Failed(message.clone()));
                self.emit(LoaderEvent::PageFailed {
                    generation,
                    index,
                    message,
                });
            }
        }
    }

    fn finish_pass(&mut self, generation: Generation) {
        for index in self.slots.pending_indices() {
            let message = "render did not complete".to_string();
            self.slots.set(index, PageSlot::Failed(message.clone()));
            self.emit(LoaderEvent::PageFailed {
                generation,
                index,
                message,
            });
        }

        if self.pass == Some(PassKind::Reload) {
            self.emit(LoaderEvent::Ready { generation });
        }
        self.pass = None;

        log::info!(
            "All {} page(s) settled at {}",
            self.slots.len(),
            self.zoom
        );
        self.emit(LoaderEvent::Settled { generation });
    }

    fn start_pass(&mut self, kind: PassKind, generation: Generation) {
        let Some(document) = self.document.clone() else {
            return;
        };
        let zoom = self.zoom;
        self.pass = Some(kind);
        self.emit(LoaderEvent::PassStarted {
            generation,
            kind,
            zoom,
        });

        let mut work = Vec::new();
        for index in 0..self.slots.len() {
            if let Some(page) = self.cache.get(&CacheKey::new(index, zoom)) {
                log::debug!("Page {} served from cache at {}", index + 1, zoom);
                self.slots.set(index, PageSlot::Ready(page.clone()));
                self.emit(LoaderEvent::PageRendered {
                    generation,
                    index,
                    page,
                });
            } else {
                if kind == PassKind::Reload {
                    self.slots.set(index, PageSlot::Pending);
                }
                work.push(index);
            }
        }

        let (prefix, rest): (Vec<usize>, Vec<usize>) = match kind {
            PassKind::Initial => {
                let prefix_len = self.config.initial_pages_to_load;
                work.into_iter().partition(|&index| index < prefix_len)
            }
            PassKind::Reload => (Vec::new(), work),
        };

        let pass = RenderPass {
            document,
            zoom,
            generation,
            current: self.generation.clone(),
            prefix,
            rest,
            concurrency: self.config.max_concurrent_renders.max(1),
            job_tx: self.job_tx.clone(),
        };
        tokio::spawn(pass.run());
    }
}

/// One load or reload pass over a set of pages
struct RenderPass<D> {
    document: Arc<D>,
    zoom: ZoomLevel,
    generation: Generation,
    current: Arc<AtomicU64>,
    /// Rendered strictly in order before readiness
    prefix: Vec<usize>,
    /// Rendered afterwards, possibly out of order
    rest: Vec<usize>,
    concurrency: usize,
    job_tx: mpsc::UnboundedSender<Job<D>>,
}

impl<D: PageSource> RenderPass<D> {
    fn is_current(&self) -> bool {
        self.current.load(Ordering::SeqCst) == self.generation
    }

    fn send(&self, job: Job<D>) {
        let _ = self.job_tx.send(job);
    }

    fn send_page(&self, index: usize, result: Result<RenderedPage>) {
        self.send(Job::Page {
            generation: self.generation,
            index,
            zoom: self.zoom,
            result,
        });
    }

    async fn run(self) {
        for &index in &self.prefix {
            if !self.is_current() {
                return;
            }
            let result = render_blocking(self.document.clone(), index, self.zoom).await;
            self.send_page(index, result);
        }
        self.send(Job::PrefixDone {
            generation: self.generation,
        });

        let mut in_flight = JoinSet::new();
        let mut queue = self.rest.iter().copied();
        loop {
            // Stop issuing renders once superseded; drain what is in flight
            while in_flight.len() < self.concurrency && self.is_current() {
                let Some(index) = queue.next() else {
                    break;
                };
                let document = self.document.clone();
                let zoom = self.zoom;
                in_flight.spawn(async move { (index, render_blocking(document, index, zoom).await) });
            }

            match in_flight.join_next().await {
                Some(Ok((index, result))) => self.send_page(index, result),
                Some(Err(error)) => log::error!("Render task failed: {}", error),
                None => break,
            }
        }

        if self.is_current() {
            self.send(Job::PassDone {
                generation: self.generation,
            });
        }
    }
}

async fn render_blocking<D: PageSource>(
    document: Arc<D>,
    index: usize,
    zoom: ZoomLevel,
) -> Result<RenderedPage> {
    tokio::task::spawn_blocking(move || document.render_page(index, zoom)).await?
}
