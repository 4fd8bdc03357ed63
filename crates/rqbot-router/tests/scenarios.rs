//! End-to-end routing scenarios against in-memory transport and backend.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rqbot_backend::{
    BackendError, Candidate, EnqueueResponse, ImportRequest, LibraryItem, MediaBackend, QueueEntry,
};
use rqbot_channels::{Attachment, ChatEvent, MemoryTransport, SharedTransport};
use rqbot_core::config::RouterConfig;
use rqbot_hooks::{HandlerDescriptor, HandlerError, HandlerRegistry, MessageHandler};
use rqbot_router::{replies, Command, MediaStore, MessageRouter, Outcome};

const BOT: &str = "bot@s.whatsapp.net";
const USER: &str = "5511999999999@s.whatsapp.net";
const GROUP: &str = "120363025@g.us";

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Import(ImportRequest),
    SetLabel(String, String),
    SearchLibrary(String, usize),
    Enqueue(String, String),
    EnqueueById(i64),
    SearchVideos(String, usize),
    PlayVideo(String),
    Toggle,
    Next,
    SetVolume(u8),
    Queue,
    ClearQueue,
}

#[derive(Default)]
struct FakeBackend {
    calls: Mutex<Vec<Call>>,
    videos: Vec<Candidate>,
    library: Vec<LibraryItem>,
    playlist: Vec<QueueEntry>,
    fail: bool,
}

impl FakeBackend {
    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), BackendError> {
        self.calls.lock().unwrap().push(call);
        if self.fail {
            return Err(BackendError::Status {
                status: 503,
                body: "down".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MediaBackend for FakeBackend {
    async fn import(&self, req: &ImportRequest) -> Result<(), BackendError> {
        self.record(Call::Import(req.clone()))
    }

    async fn set_label(&self, code: &str, label: &str) -> Result<(), BackendError> {
        self.record(Call::SetLabel(code.into(), label.into()))
    }

    async fn search_library(&self, query: &str, limit: usize) -> Result<Vec<LibraryItem>, BackendError> {
        self.record(Call::SearchLibrary(query.into(), limit))?;
        Ok(self.library.iter().take(limit).cloned().collect())
    }

    async fn enqueue(&self, query: &str, requested_by: &str) -> Result<EnqueueResponse, BackendError> {
        self.record(Call::Enqueue(query.into(), requested_by.into()))?;
        Ok(EnqueueResponse {
            ok: !query.contains("confirm"),
            title: None,
            message: None,
        })
    }

    async fn enqueue_by_id(&self, db_id: i64) -> Result<(), BackendError> {
        self.record(Call::EnqueueById(db_id))
    }

    async fn search_videos(&self, query: &str, limit: usize) -> Result<Vec<Candidate>, BackendError> {
        self.record(Call::SearchVideos(query.into(), limit))?;
        Ok(self.videos.iter().take(limit).cloned().collect())
    }

    async fn play_video(&self, video_id: &str) -> Result<(), BackendError> {
        self.record(Call::PlayVideo(video_id.into()))
    }

    async fn toggle_playback(&self) -> Result<(), BackendError> {
        self.record(Call::Toggle)
    }

    async fn next(&self) -> Result<(), BackendError> {
        self.record(Call::Next)
    }

    async fn set_volume(&self, value: u8) -> Result<(), BackendError> {
        self.record(Call::SetVolume(value))
    }

    async fn queue(&self) -> Result<Vec<QueueEntry>, BackendError> {
        self.record(Call::Queue)?;
        Ok(self.playlist.clone())
    }

    async fn clear_queue(&self) -> Result<(), BackendError> {
        self.record(Call::ClearQueue)
    }
}

#[derive(Default)]
struct MemoryStore {
    saved: Mutex<Vec<(String, usize)>>,
}

#[async_trait]
impl MediaStore for MemoryStore {
    async fn save(&self, file_name: &str, data: &[u8]) -> std::io::Result<String> {
        self.saved.lock().unwrap().push((file_name.to_string(), data.len()));
        Ok(format!("media/{file_name}"))
    }
}

/// Claims every event it sees, like the assistant would.
struct Claiming;

#[async_trait]
impl MessageHandler for Claiming {
    async fn on_message(
        &self,
        transport: &SharedTransport,
        event: &ChatEvent,
        _is_group: bool,
    ) -> Result<bool, HandlerError> {
        transport.send_text(&event.conversation_id, "claimed").await?;
        Ok(true)
    }
}

struct Harness {
    router: Arc<MessageRouter>,
    transport: Arc<MemoryTransport>,
    backend: Arc<FakeBackend>,
    store: Arc<MemoryStore>,
}

impl Harness {
    fn new(backend: FakeBackend) -> Self {
        Self::with_registry(backend, HandlerRegistry::new())
    }

    fn with_registry(backend: FakeBackend, registry: HandlerRegistry) -> Self {
        let transport = Arc::new(MemoryTransport::new(Some(BOT)));
        let backend = Arc::new(backend);
        let store = Arc::new(MemoryStore::default());
        let router = MessageRouter::new(
            &RouterConfig::default(),
            transport.clone(),
            backend.clone(),
            store.clone(),
            Arc::new(registry),
        );
        Self {
            router: Arc::new(router),
            transport,
            backend,
            store,
        }
    }

    async fn dm(&self, text: &str) -> Outcome {
        self.router.handle(ChatEvent::new(USER, USER, text)).await
    }

    /// Wait until every submitted event has been routed.
    async fn settle(&self) {
        for _ in 0..500 {
            if self.router.is_idle() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("router did not drain its inbox");
    }
}

fn videos(n: usize) -> Vec<Candidate> {
    (1..=n)
        .map(|i| Candidate {
            id: format!("vid{i}"),
            title: format!("Song {i}"),
            subtitle: format!("Channel {i}"),
            duration: "3:30".into(),
        })
        .collect()
}

#[tokio::test]
async fn volume_command_sets_backend_volume() {
    let h = Harness::new(FakeBackend::default());

    let outcome = h.dm("volume 50").await;

    assert_eq!(outcome, Outcome::Command(Command::Volume));
    assert_eq!(h.backend.calls(), vec![Call::SetVolume(50)]);
    let texts = h.transport.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("50"));
}

#[tokio::test]
async fn search_then_numeric_selection_plays_second_result() {
    let h = Harness::new(FakeBackend {
        videos: videos(7),
        ..Default::default()
    });

    h.dm("tocar some song").await;

    assert_eq!(h.backend.calls(), vec![Call::SearchVideos("some song".into(), 5)]);
    assert_eq!(h.router.pending().get(USER).unwrap().len(), 5);
    let listing = &h.transport.texts()[0];
    assert!(listing.contains("1. Song 1"));
    assert!(listing.contains("5. Song 5"));

    let outcome = h.dm("2").await;

    assert_eq!(outcome, Outcome::Selection);
    assert_eq!(h.backend.calls()[1], Call::PlayVideo("vid2".into()));
    assert_eq!(h.backend.calls().len(), 2);
    assert!(h.router.pending().get(USER).is_none());
}

#[tokio::test]
async fn invalid_indices_keep_the_selection() {
    let h = Harness::new(FakeBackend {
        videos: videos(3),
        ..Default::default()
    });
    h.dm("tocar some song").await;

    for text in ["0", "-1", "4"] {
        assert_eq!(h.dm(text).await, Outcome::Selection);
    }

    assert_eq!(h.backend.calls().len(), 1);
    assert_eq!(h.router.pending().get(USER).unwrap().len(), 3);
    let texts = h.transport.texts();
    assert!(texts[1..].iter().all(|t| *t == replies::invalid_index(3)));
}

#[tokio::test]
async fn cancel_consumes_without_backend_call() {
    let h = Harness::new(FakeBackend {
        videos: videos(3),
        ..Default::default()
    });
    h.dm("tocar some song").await;

    h.dm("Cancelar").await;

    assert_eq!(h.backend.calls().len(), 1);
    assert!(h.router.pending().get(USER).is_none());
    assert_eq!(h.transport.texts().last().unwrap(), replies::SELECTION_CANCELLED);
}

#[tokio::test]
async fn new_search_replaces_pending_selection() {
    let h = Harness::new(FakeBackend {
        videos: videos(3),
        ..Default::default()
    });
    h.dm("tocar first").await;
    h.dm("tocar second").await;

    assert_eq!(h.router.pending().len(), 1);
    h.dm("1").await;
    assert!(h.router.pending().is_empty());
}

#[tokio::test]
async fn numeric_text_without_pending_is_not_a_command() {
    let h = Harness::new(FakeBackend::default());
    assert_eq!(h.dm("50").await, Outcome::Onboarding);
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn unmentioned_group_message_is_silent() {
    let h = Harness::new(FakeBackend {
        videos: videos(3),
        ..Default::default()
    });

    for text in ["volume 50", "tocar algo", "ajuda", "1", "bom dia"] {
        let outcome = h.router.handle(ChatEvent::new(GROUP, USER, text)).await;
        assert_eq!(outcome, Outcome::NotAddressed);
    }
    let with_audio = ChatEvent::new(GROUP, USER, "")
        .with_attachment(Attachment::new("audio/mpeg", vec![1, 2, 3]));
    assert_eq!(h.router.handle(with_audio).await, Outcome::NotAddressed);

    assert!(h.transport.actions().is_empty());
    assert!(h.backend.calls().is_empty());
}

#[tokio::test]
async fn mentioned_group_message_dispatches_and_falls_back() {
    let h = Harness::new(FakeBackend {
        videos: videos(3),
        ..Default::default()
    });

    let cmd = ChatEvent::new(GROUP, USER, "@bot pular").with_mentions([BOT]);
    assert_eq!(h.router.handle(cmd).await, Outcome::Command(Command::Next));

    let search = ChatEvent::new(GROUP, USER, "@bot tocar algo").with_mentions([BOT]);
    h.router.handle(search).await;
    let pick = ChatEvent::new(GROUP, USER, "@bot 3").with_mentions([BOT]);
    assert_eq!(h.router.handle(pick).await, Outcome::Selection);
    assert_eq!(h.backend.calls().last().unwrap(), &Call::PlayVideo("vid3".into()));

    let chatter = ChatEvent::new(GROUP, USER, "@bot bom dia").with_mentions([BOT]);
    assert_eq!(h.router.handle(chatter).await, Outcome::Fallback);
    assert_eq!(h.transport.texts().last().unwrap(), replies::HELP_TEXT);
}

#[tokio::test]
async fn onboarding_is_sent_once_per_cooldown() {
    let h = Harness::new(FakeBackend::default());

    assert_eq!(h.dm("bom dia").await, Outcome::Onboarding);
    assert_eq!(h.dm("tudo bem?").await, Outcome::Suppressed);
    assert_eq!(h.dm("").await, Outcome::Suppressed);

    assert_eq!(h.transport.texts(), vec![replies::onboarding()]);

    let other = ChatEvent::new("5521@s.whatsapp.net", "5521@s.whatsapp.net", "oi");
    assert_eq!(h.router.handle(other).await, Outcome::Onboarding);
}

#[tokio::test]
async fn priority_handler_claims_free_text_before_onboarding() {
    let registry = HandlerRegistry::new();
    registry
        .register(HandlerDescriptor::new("assistant", Arc::new(Claiming)).with_priority())
        .unwrap();
    let h = Harness::with_registry(FakeBackend::default(), registry);

    assert_eq!(h.dm("quem canta essa?").await, Outcome::Handled);
    assert_eq!(h.transport.texts(), vec!["claimed"]);

    // Commands never reach the handler chain.
    assert_eq!(h.dm("fila").await, Outcome::Command(Command::Queue));
}

#[tokio::test]
async fn queue_rendering_is_stable() {
    let h = Harness::new(FakeBackend {
        playlist: vec![
            QueueEntry {
                index: 0,
                filename: "a.mp3".into(),
                current: true,
            },
            QueueEntry {
                index: 1,
                filename: "b.mp3".into(),
                current: false,
            },
        ],
        ..Default::default()
    });

    h.dm("fila").await;
    h.dm("queue").await;

    let texts = h.transport.texts();
    assert_eq!(texts[0], texts[1]);
    assert!(texts[0].contains("▶️ 1. a.mp3"));
}

#[tokio::test]
async fn empty_queue_reply() {
    let h = Harness::new(FakeBackend::default());
    h.dm("fila").await;
    assert_eq!(h.transport.texts(), vec![replies::QUEUE_EMPTY]);
}

#[tokio::test]
async fn audio_attachment_is_imported() {
    let h = Harness::new(FakeBackend::default());
    let event = ChatEvent::new(USER, USER, "")
        .with_attachment(Attachment::new("audio/mpeg", vec![0u8; 16]));

    assert_eq!(h.router.handle(event).await, Outcome::MediaImport);

    let saved = h.store.saved.lock().unwrap().clone();
    assert_eq!(saved.len(), 1);
    let (file_name, len) = &saved[0];
    assert!(file_name.starts_with('A') && file_name.ends_with(".mp3"));
    assert_eq!(*len, 16);

    let id = file_name.trim_end_matches(".mp3");
    assert_eq!(
        h.backend.calls(),
        vec![Call::Import(ImportRequest {
            id: id.to_string(),
            file: format!("media/{file_name}"),
            label: None,
        })]
    );

    let reply = &h.transport.texts()[0];
    assert!(reply.contains(&format!("ID: {id}")));
    assert!(reply.contains(&format!("rotulo {id} <texto>")));
    assert!(reply.contains(&format!("tocar {id}")));
}

#[tokio::test]
async fn video_attachment_is_refused() {
    let h = Harness::new(FakeBackend::default());
    let event = ChatEvent::new(USER, USER, "tocar isso")
        .with_attachment(Attachment::new("video/mp4", vec![0u8; 16]));

    h.router.handle(event).await;

    assert!(h.store.saved.lock().unwrap().is_empty());
    assert!(h.backend.calls().is_empty());
    assert_eq!(h.transport.texts(), vec![replies::UNSUPPORTED_MEDIA]);
}

#[tokio::test]
async fn failed_import_has_single_reply() {
    let h = Harness::new(FakeBackend {
        fail: true,
        ..Default::default()
    });
    let event = ChatEvent::new(USER, USER, "")
        .with_attachment(Attachment::new("audio/ogg; codecs=opus", vec![1]));

    h.router.handle(event).await;

    assert_eq!(h.transport.texts(), vec![replies::MEDIA_FAILURE]);
}

#[tokio::test]
async fn url_play_enqueues_and_reports_confirmation() {
    let h = Harness::new(FakeBackend::default());

    h.dm("https://youtu.be/abc").await;
    h.dm("tocar https://x.test/confirm").await;

    assert_eq!(
        h.backend.calls(),
        vec![
            Call::Enqueue("https://youtu.be/abc".into(), USER.into()),
            Call::Enqueue("https://x.test/confirm".into(), USER.into()),
        ]
    );
    let texts = h.transport.texts();
    assert!(texts[0].contains("https://youtu.be/abc"));
    assert_eq!(texts[1], replies::CONFIRMATION_REQUIRED);
}

#[tokio::test]
async fn local_id_play_looks_up_library_first() {
    let h = Harness::new(FakeBackend {
        library: vec![LibraryItem {
            db_id: 42,
            title: "Minha faixa".into(),
        }],
        ..Default::default()
    });

    h.dm("tocar A123456").await;

    assert_eq!(
        h.backend.calls(),
        vec![
            Call::SearchLibrary("A123456".into(), 1),
            Call::EnqueueById(42)
        ]
    );
    assert!(h.transport.texts()[0].contains("Minha faixa"));
}

#[tokio::test]
async fn unknown_local_id_is_not_found() {
    let h = Harness::new(FakeBackend::default());
    h.dm("tocar #77").await;
    assert_eq!(h.backend.calls(), vec![Call::SearchLibrary("77".into(), 1)]);
    assert_eq!(h.transport.texts(), vec![replies::local_not_found("77")]);
}

#[tokio::test]
async fn empty_search_reports_nothing_found() {
    let h = Harness::new(FakeBackend::default());
    h.dm("tocar nada disso").await;
    assert!(h.router.pending().is_empty());
    assert_eq!(h.transport.texts(), vec![replies::nothing_found("nada disso")]);
}

#[tokio::test]
async fn empty_search_drops_the_previous_selection() {
    let h = Harness::new(FakeBackend::default());
    h.router.pending().put(USER, videos(3));

    h.dm("tocar nada existe").await;
    let outcome = h.dm("1").await;

    assert!(h.router.pending().is_empty());
    assert_eq!(outcome, Outcome::Onboarding);
    assert_eq!(h.backend.calls(), vec![Call::SearchVideos("nada existe".into(), 5)]);
}

#[tokio::test]
async fn failed_search_drops_the_previous_selection() {
    let h = Harness::new(FakeBackend {
        fail: true,
        ..Default::default()
    });
    h.router.pending().put(USER, videos(3));

    h.dm("tocar outra coisa").await;

    assert!(h.router.pending().is_empty());
    assert_eq!(h.transport.texts(), vec![replies::BACKEND_FAILURE]);
}

#[tokio::test]
async fn validation_errors_skip_the_backend() {
    let h = Harness::new(FakeBackend::default());

    h.dm("tocar").await;
    h.dm("rotulo A123").await;
    let group = ChatEvent::new(GROUP, USER, "@bot volume alto").with_mentions([BOT]);
    h.router.handle(group).await;

    assert!(h.backend.calls().is_empty());
    assert_eq!(
        h.transport.texts(),
        vec![replies::PLAY_USAGE, replies::LABEL_USAGE, replies::VOLUME_USAGE]
    );
}

#[tokio::test]
async fn label_and_simple_commands() {
    let h = Harness::new(FakeBackend::default());

    h.dm("rotulo A123456 Hino da torcida").await;
    h.dm("pausar").await;
    h.dm("pular").await;
    h.dm("limpar").await;
    h.dm("ajuda").await;

    assert_eq!(
        h.backend.calls(),
        vec![
            Call::SetLabel("A123456".into(), "Hino da torcida".into()),
            Call::Toggle,
            Call::Next,
            Call::ClearQueue,
        ]
    );
    let texts = h.transport.texts();
    assert_eq!(texts[1], replies::TOGGLED);
    assert_eq!(texts[2], replies::SKIPPED);
    assert_eq!(texts[3], replies::QUEUE_CLEARED);
    assert_eq!(texts[4], replies::HELP_TEXT);
}

#[tokio::test]
async fn backend_failure_gives_one_generic_reply() {
    let h = Harness::new(FakeBackend {
        fail: true,
        ..Default::default()
    });

    h.dm("volume 10").await;

    assert_eq!(h.backend.calls(), vec![Call::SetVolume(10)]);
    assert_eq!(h.transport.texts(), vec![replies::BACKEND_FAILURE]);
}

#[tokio::test]
async fn self_originated_events_are_dropped() {
    let h = Harness::new(FakeBackend::default());
    let own = ChatEvent::new(USER, BOT, "volume 50").from_me(true);

    assert_eq!(h.router.handle(own).await, Outcome::SelfOriginated);
    assert!(h.transport.actions().is_empty());
}

#[tokio::test]
async fn self_originated_events_pass_when_allowed() {
    let transport = Arc::new(MemoryTransport::new(Some(BOT)));
    let backend = Arc::new(FakeBackend::default());
    let config = RouterConfig {
        allow_from_me: true,
        ..Default::default()
    };
    let router = MessageRouter::new(
        &config,
        transport.clone(),
        backend.clone(),
        Arc::new(MemoryStore::default()),
        Arc::new(HandlerRegistry::new()),
    );

    let own = ChatEvent::new(USER, BOT, "volume 50").from_me(true);
    assert_eq!(router.handle(own).await, Outcome::Command(Command::Volume));
    assert_eq!(backend.calls(), vec![Call::SetVolume(50)]);
}

#[tokio::test]
async fn transport_failure_hits_the_top_level_guard() {
    let h = Harness::new(FakeBackend::default());
    h.transport.fail_text_sends(true);

    assert_eq!(h.dm("pular").await, Outcome::Failed);
    assert_eq!(h.backend.calls(), vec![Call::Next]);
}

#[tokio::test]
async fn conversations_do_not_share_pending_state() {
    let h = Harness::new(FakeBackend {
        videos: videos(3),
        ..Default::default()
    });
    h.dm("tocar algo").await;

    let other = "5521@s.whatsapp.net";
    let outcome = h.router.handle(ChatEvent::new(other, other, "1")).await;

    assert_eq!(outcome, Outcome::Onboarding);
    assert!(h.router.pending().get(USER).is_some());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn submitted_events_are_routed_in_order() {
    for _ in 0..100 {
        let h = Harness::new(FakeBackend {
            videos: videos(3),
            ..Default::default()
        });

        h.router.submit(ChatEvent::new(USER, USER, "tocar some song"));
        h.router.submit(ChatEvent::new(USER, USER, "2"));
        h.settle().await;

        assert_eq!(
            h.backend.calls(),
            vec![
                Call::SearchVideos("some song".into(), 5),
                Call::PlayVideo("vid2".into()),
            ]
        );
        assert!(h.router.pending().is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn conversations_drain_independently() {
    let h = Harness::new(FakeBackend::default());
    let other = "5521@s.whatsapp.net";

    for i in 0..10 {
        h.router.submit(ChatEvent::new(USER, USER, format!("volume {i}")));
        h.router.submit(ChatEvent::new(other, other, format!("volume {}", 50 + i)));
    }
    h.settle().await;

    let calls = h.backend.calls();
    assert_eq!(calls.len(), 20);
    let mine: Vec<_> = calls
        .iter()
        .filter_map(|c| match c {
            Call::SetVolume(v) if *v < 50 => Some(*v),
            _ => None,
        })
        .collect();
    assert_eq!(mine, (0..10).collect::<Vec<u8>>());
}
