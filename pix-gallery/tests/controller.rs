use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use tokio_test::{assert_err, assert_ok};

use pix_blob::{
    BlobError, BlobResult, BlobStore, CollectionConfig, ImageRef, Listing, MemoryStore,
    ObjectItem, ObjectPath, PutResult, RemoteCollection, StoreCapabilities,
};
use pix_gallery::{
    DisplayFlags, FsMediaReader, GalleryBody, GalleryConfig, GalleryController, GalleryError,
    GalleryResult, ImagePicker, LoadState, MediaReader, PathPicker, PickOptions, PickOutcome,
    UploadPhase, Viewport,
};

/// Store wrapper that records uploads and can be told to fail
#[derive(Clone, Default)]
struct RecordingStore {
    inner: MemoryStore,
    uploads: Arc<Mutex<Vec<String>>>,
    fail_list: Arc<Mutex<bool>>,
    fail_upload: Arc<Mutex<bool>>,
}

impl RecordingStore {
    fn with_images(keys: &[&str]) -> Self {
        let mut inner = MemoryStore::new();
        for key in keys {
            inner = inner.with_object(*key, "img");
        }
        Self {
            inner,
            ..Self::default()
        }
    }

    fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }

    fn set_fail_list(&self, fail: bool) {
        *self.fail_list.lock().unwrap() = fail;
    }

    fn set_fail_upload(&self, fail: bool) {
        *self.fail_upload.lock().unwrap() = fail;
    }
}

#[async_trait]
impl BlobStore for RecordingStore {
    async fn list(&self, path: &ObjectPath) -> BlobResult<Listing> {
        if *self.fail_list.lock().unwrap() {
            return Err(BlobError::list_failed(path.to_string(), "network unreachable"));
        }
        self.inner.list(path).await
    }

    async fn resolve_url(&self, item: &ObjectItem) -> BlobResult<String> {
        self.inner.resolve_url(item).await
    }

    async fn upload(
        &self,
        path: &ObjectPath,
        body: Bytes,
        content_type: Option<&str>,
    ) -> BlobResult<PutResult> {
        self.uploads.lock().unwrap().push(path.as_str().to_string());
        if *self.fail_upload.lock().unwrap() {
            return Err(BlobError::upload_failed(path.as_str(), "403 Forbidden"));
        }
        self.inner.upload(path, body, content_type).await
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::basic()
    }
}

enum Step {
    Cancel,
    Pick(&'static str),
    Fail,
}

/// Picker that replays a fixed script of user reactions
#[derive(Clone, Default)]
struct ScriptedPicker {
    steps: Arc<Mutex<VecDeque<Step>>>,
    seen_options: Arc<Mutex<Vec<PickOptions>>>,
}

impl ScriptedPicker {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: Arc::new(Mutex::new(steps.into())),
            seen_options: Arc::default(),
        }
    }
}

#[async_trait]
impl ImagePicker for ScriptedPicker {
    async fn pick_image(&self, options: &PickOptions) -> GalleryResult<PickOutcome> {
        self.seen_options.lock().unwrap().push(options.clone());
        match self.steps.lock().unwrap().pop_front() {
            Some(Step::Pick(locator)) => Ok(PickOutcome::Picked(ImageRef::from(locator))),
            Some(Step::Fail) => Err(GalleryError::picker("permission denied")),
            Some(Step::Cancel) | None => Ok(PickOutcome::Cancelled),
        }
    }
}

/// Reader that serves the same bytes for any locator
struct StaticReader;

#[async_trait]
impl MediaReader for StaticReader {
    async fn read(&self, _image: &ImageRef) -> GalleryResult<Bytes> {
        Ok(Bytes::from_static(b"\x89PNG fake image"))
    }
}

/// Test factory functions
fn create_controller(store: &RecordingStore, picker: ScriptedPicker, config: GalleryConfig) -> GalleryController {
    GalleryController::new(
        RemoteCollection::new(store.clone(), CollectionConfig::default()),
        picker,
        StaticReader,
        config,
    )
}

fn create_default_controller(store: &RecordingStore, steps: Vec<Step>) -> GalleryController {
    create_controller(store, ScriptedPicker::new(steps), GalleryConfig::default())
}

fn cat() -> ImageRef {
    ImageRef::from("gs://bucket/images/cat.png")
}

#[tokio::test]
async fn test_view_is_loading_before_activation() {
    let store = RecordingStore::default();
    let gallery = create_default_controller(&store, vec![]);

    let view = gallery.view();

    assert_eq!(view.load_state, LoadState::Idle);
    assert!(view.is_loading());
    assert!(!view.is_empty_gallery());
}

#[tokio::test]
async fn test_activate_with_empty_bucket_shows_empty_gallery() {
    let store = RecordingStore::default();
    let mut gallery = create_default_controller(&store, vec![]);

    let count = assert_ok!(gallery.activate().await);

    assert_eq!(count, 0);
    assert_eq!(gallery.load_state(), LoadState::Ready);
    assert!(gallery.images().is_empty());
    let view = gallery.view();
    assert_eq!(view.body, GalleryBody::Empty);
    assert!(!view.is_loading());
}

#[tokio::test]
async fn test_activate_seeds_default_display_flags() {
    let store = RecordingStore::with_images(&["a.png", "b.png", "trips/c.png"]);
    let mut gallery = create_default_controller(&store, vec![]);

    assert_ok!(gallery.activate().await);

    assert_eq!(gallery.images().len(), 3);
    assert_eq!(gallery.display_state().len(), 3);
    for image in gallery.images() {
        assert_eq!(gallery.display_flags(image), DisplayFlags::default());
    }
}

#[tokio::test]
async fn test_failed_activation_ends_ready_and_empty() {
    let store = RecordingStore::with_images(&["a.png"]);
    store.set_fail_list(true);
    let mut gallery = create_default_controller(&store, vec![]);

    let result = gallery.activate().await;

    assert!(matches!(result, Err(GalleryError::Transfer(_))));
    assert_eq!(gallery.load_state(), LoadState::Ready);
    assert!(gallery.images().is_empty());
    assert!(gallery.view().is_empty_gallery());
    assert!(gallery.last_error().is_some());
}

#[tokio::test]
async fn test_failed_refresh_discards_previous_collection() {
    let store = RecordingStore::with_images(&["a.png", "b.png"]);
    let mut gallery = create_default_controller(&store, vec![]);
    assert_ok!(gallery.activate().await);
    let first = gallery.images()[0].clone();
    gallery.toggle_name(&first);

    store.set_fail_list(true);
    assert_err!(gallery.activate().await);

    assert!(gallery.images().is_empty());
    assert!(gallery.display_state().is_empty());

    store.set_fail_list(false);
    assert_eq!(assert_ok!(gallery.activate().await), 2);
    assert!(gallery.last_error().is_none());
}

#[tokio::test]
async fn test_cancelled_pick_changes_nothing() {
    let store = RecordingStore::with_images(&["a.png"]);
    let mut gallery = create_default_controller(&store, vec![Step::Cancel]);
    assert_ok!(gallery.activate().await);
    let images_before = gallery.images().to_vec();

    let outcome = assert_ok!(gallery.request_pick().await);

    assert_eq!(outcome, PickOutcome::Cancelled);
    assert_eq!(gallery.session().phase(), UploadPhase::Idle);
    assert_eq!(gallery.session().selected(), None);
    assert_eq!(gallery.images(), images_before.as_slice());
    assert_eq!(gallery.display_state().len(), 1);
}

#[tokio::test]
async fn test_cancelled_pick_keeps_existing_selection() {
    let store = RecordingStore::default();
    let mut gallery = create_default_controller(&store, vec![Step::Pick("gs://bucket/images/cat.png"), Step::Cancel]);

    assert_ok!(gallery.request_pick().await);
    assert_ok!(gallery.request_pick().await);

    assert_eq!(gallery.session().phase(), UploadPhase::Confirming);
    assert_eq!(gallery.session().selected(), Some(&cat()));
}

#[tokio::test]
async fn test_pick_then_confirm_uploads_under_images() {
    let store = RecordingStore::default();
    let mut gallery = create_default_controller(&store, vec![Step::Pick("gs://bucket/images/cat.png")]);
    assert_ok!(gallery.activate().await);

    let outcome = assert_ok!(gallery.request_pick().await);
    assert_eq!(outcome, PickOutcome::Picked(cat()));
    assert_eq!(gallery.session().phase(), UploadPhase::Confirming);
    assert_eq!(gallery.display_flags(&cat()), DisplayFlags::default());
    assert!(store.uploads().is_empty());

    let ack = assert_ok!(gallery.confirm_upload().await);

    assert_eq!(store.uploads(), vec!["images/cat.png"]);
    assert_eq!(ack.path.as_str(), "images/cat.png");
    assert_eq!(gallery.session().phase(), UploadPhase::Idle);
    assert_eq!(gallery.session().selected(), None);
    assert_eq!(gallery.images(), &[ImageRef::from("memory://images/cat.png")]);
    assert!(!gallery.display_state().contains(&cat()));
    assert!(gallery.last_error().is_none());
}

#[tokio::test]
async fn test_rejected_upload_still_resets_session() {
    let store = RecordingStore::with_images(&["a.png"]);
    store.set_fail_upload(true);
    let mut gallery = create_default_controller(&store, vec![Step::Pick("gs://bucket/images/cat.png")]);
    assert_ok!(gallery.activate().await);
    let images_before = gallery.images().to_vec();

    assert_ok!(gallery.request_pick().await);
    let result = gallery.confirm_upload().await;

    assert!(matches!(result, Err(GalleryError::Upload(_))));
    assert_eq!(gallery.session().phase(), UploadPhase::Idle);
    assert_eq!(gallery.session().selected(), None);
    assert_eq!(gallery.images(), images_before.as_slice());
    assert!(gallery.last_error().is_some());
    assert!(!gallery.view().controls.busy);
}

#[tokio::test]
async fn test_confirm_without_selection_touches_nothing() {
    let store = RecordingStore::with_images(&["a.png", "b.png"]);
    let mut gallery = create_default_controller(&store, vec![]);
    assert_ok!(gallery.activate().await);
    let first = gallery.images()[0].clone();
    gallery.toggle_name(&first);
    let images_before = gallery.images().to_vec();
    let flags_before: Vec<DisplayFlags> = images_before.iter().map(|i| gallery.display_flags(i)).collect();

    let result = gallery.confirm_upload().await;

    assert!(matches!(result, Err(GalleryError::NoSelection)));
    assert!(store.uploads().is_empty());
    assert_eq!(gallery.images(), images_before.as_slice());
    let flags_after: Vec<DisplayFlags> = images_before.iter().map(|i| gallery.display_flags(i)).collect();
    assert_eq!(flags_after, flags_before);
    assert_eq!(gallery.display_state().len(), 2);
}

#[tokio::test]
async fn test_upload_on_pick_skips_confirmation() {
    let store = RecordingStore::default();
    let picker = ScriptedPicker::new(vec![Step::Pick("file:///sdcard/DCIM/dog.jpg")]);
    let mut gallery = create_controller(&store, picker, GalleryConfig::new().upload_on_pick());
    assert_ok!(gallery.activate().await);

    let outcome = assert_ok!(gallery.request_pick().await);

    assert!(matches!(outcome, PickOutcome::Picked(_)));
    assert_eq!(store.uploads(), vec!["images/dog.jpg"]);
    assert_eq!(gallery.session().phase(), UploadPhase::Idle);
    assert_eq!(gallery.images(), &[ImageRef::from("memory://images/dog.jpg")]);
}

#[tokio::test]
async fn test_upload_on_pick_failure_is_reported() {
    let store = RecordingStore::default();
    store.set_fail_upload(true);
    let picker = ScriptedPicker::new(vec![Step::Pick("file:///sdcard/DCIM/dog.jpg")]);
    let mut gallery = create_controller(&store, picker, GalleryConfig::new().upload_on_pick());

    let result = gallery.request_pick().await;

    assert!(matches!(result, Err(GalleryError::Upload(_))));
    assert!(gallery.session().is_idle());
    assert!(gallery.images().is_empty());
}

#[tokio::test]
async fn test_picker_receives_configured_options() {
    let store = RecordingStore::default();
    let picker = ScriptedPicker::new(vec![Step::Cancel]);
    let options = PickOptions {
        allow_editing: false,
        aspect: (1, 1),
        quality: 0.5,
    };
    let mut gallery = create_controller(
        &store,
        picker.clone(),
        GalleryConfig::new().with_pick_options(options.clone()),
    );

    assert_ok!(gallery.request_pick().await);

    assert_eq!(picker.seen_options.lock().unwrap().as_slice(), &[options]);
}

#[tokio::test]
async fn test_picker_failure_restores_session() {
    let store = RecordingStore::default();
    let mut gallery = create_default_controller(&store, vec![Step::Pick("gs://bucket/images/cat.png"), Step::Fail]);
    assert_ok!(gallery.request_pick().await);

    let result = gallery.request_pick().await;

    assert!(matches!(result, Err(GalleryError::Picker { .. })));
    assert_eq!(gallery.session().phase(), UploadPhase::Confirming);
    assert_eq!(gallery.session().selected(), Some(&cat()));
    assert!(gallery.last_error().is_some());
}

#[tokio::test]
async fn test_empty_locator_from_picker_is_rejected() {
    let store = RecordingStore::default();
    let mut gallery = create_default_controller(&store, vec![Step::Pick("")]);

    let result = gallery.request_pick().await;

    assert!(matches!(result, Err(GalleryError::Picker { .. })));
    assert!(gallery.session().is_idle());
}

#[tokio::test]
async fn test_new_pick_replaces_selection_and_prunes_old_flags() {
    let store = RecordingStore::default();
    let mut gallery = create_default_controller(
        &store,
        vec![Step::Pick("gs://bucket/images/cat.png"), Step::Pick("gs://bucket/images/dog.png")],
    );

    assert_ok!(gallery.request_pick().await);
    gallery.toggle_name(&cat());
    assert_ok!(gallery.request_pick().await);

    let dog = ImageRef::from("gs://bucket/images/dog.png");
    assert_eq!(gallery.session().selected(), Some(&dog));
    assert!(gallery.display_state().contains(&dog));
    assert!(!gallery.display_state().contains(&cat()));
}

#[tokio::test]
async fn test_cancel_upload_clears_staged_image() {
    let store = RecordingStore::default();
    let mut gallery = create_default_controller(&store, vec![Step::Pick("gs://bucket/images/cat.png")]);
    assert_ok!(gallery.request_pick().await);

    assert!(gallery.cancel_upload());

    assert_eq!(gallery.session().phase(), UploadPhase::Idle);
    assert_eq!(gallery.session().selected(), None);
    assert!(gallery.display_state().is_empty());
    assert!(store.uploads().is_empty());
    assert!(!gallery.cancel_upload());
}

#[tokio::test]
async fn test_toggle_name_is_an_involution() {
    let store = RecordingStore::with_images(&["a.png"]);
    let mut gallery = create_default_controller(&store, vec![]);
    assert_ok!(gallery.activate().await);
    let image = gallery.images()[0].clone();

    assert!(gallery.toggle_name(&image));
    assert!(gallery.display_flags(&image).name_visible);
    assert!(!gallery.toggle_name(&image));
    assert_eq!(gallery.display_flags(&image), DisplayFlags::default());
}

#[tokio::test]
async fn test_toggle_unknown_image_is_ignored() {
    let store = RecordingStore::with_images(&["a.png"]);
    let mut gallery = create_default_controller(&store, vec![]);
    assert_ok!(gallery.activate().await);
    let stranger = ImageRef::from("https://elsewhere.example.com/x.png");

    assert!(!gallery.toggle_name(&stranger));
    assert!(!gallery.display_state().contains(&stranger));
    assert_eq!(gallery.display_state().len(), 1);
}

#[tokio::test]
async fn test_toggle_actions_requires_configuration() {
    let store = RecordingStore::with_images(&["a.png"]);

    let mut plain = create_default_controller(&store, vec![]);
    assert_ok!(plain.activate().await);
    let image = plain.images()[0].clone();
    assert!(!plain.toggle_actions(&image));
    assert!(!plain.display_flags(&image).actions_visible);

    let mut with_actions = create_controller(&store, ScriptedPicker::default(), GalleryConfig::new().with_actions(true));
    assert_ok!(with_actions.activate().await);
    assert!(with_actions.toggle_actions(&image));
    assert!(!with_actions.display_flags(&image).name_visible);
    assert!(with_actions.view().tiles().any(|tile| tile.show_actions));
}

#[tokio::test]
async fn test_rows_follow_viewport() {
    let store = RecordingStore::with_images(&["1.png", "2.png", "3.png", "4.png", "5.png"]);
    let mut gallery = create_default_controller(&store, vec![]);
    assert_ok!(gallery.activate().await);

    let sizes: Vec<usize> = gallery.rows().iter().map(|row| row.items.len()).collect();
    assert_eq!(sizes, vec![4, 1]);

    gallery.set_viewport(Viewport::new(520.0, 250.0));
    let sizes: Vec<usize> = gallery.rows().iter().map(|row| row.items.len()).collect();
    assert_eq!(sizes, vec![2, 2, 1]);

    let narrow = gallery.layout_rows(100.0, 250.0);
    assert_eq!(narrow.len(), 5);
    let flattened: Vec<ImageRef> = narrow.into_iter().flat_map(|row| row.items).collect();
    assert_eq!(flattened, gallery.images());
}

#[tokio::test]
async fn test_view_reflects_captions_and_selection() {
    let store = RecordingStore::with_images(&["images/sun.png"]);
    let mut gallery = create_default_controller(&store, vec![Step::Pick("gs://bucket/images/cat.png")]);
    assert_ok!(gallery.activate().await);
    let sun = gallery.images()[0].clone();
    gallery.toggle_name(&sun);
    assert_ok!(gallery.request_pick().await);
    gallery.toggle_name(&cat());

    let view = gallery.view();

    let tiles: Vec<_> = view.tiles().collect();
    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].caption.as_deref(), Some("sun.png"));

    let selection = view.selection.as_ref().unwrap();
    assert_eq!(selection.image, cat());
    assert_eq!(selection.caption.as_deref(), Some("cat.png"));

    assert_eq!(view.phase, UploadPhase::Confirming);
    assert!(view.controls.can_confirm && view.controls.can_cancel && view.controls.can_pick);
}

#[tokio::test]
async fn test_repeat_upload_does_not_duplicate_image() {
    let store = RecordingStore::default();
    let mut gallery = create_default_controller(
        &store,
        vec![Step::Pick("file:///a/cat.png"), Step::Pick("file:///b/cat.png")],
    );
    assert_ok!(gallery.activate().await);

    assert_ok!(gallery.request_pick().await);
    assert_ok!(gallery.confirm_upload().await);
    assert_ok!(gallery.request_pick().await);
    assert_ok!(gallery.confirm_upload().await);

    assert_eq!(store.uploads(), vec!["images/cat.png", "images/cat.png"]);
    assert_eq!(gallery.images().len(), 1);
    assert_eq!(gallery.display_state().len(), 1);
}

#[tokio::test]
async fn test_locator_without_file_name_fails_upload() {
    let store = RecordingStore::default();
    let mut gallery = create_default_controller(&store, vec![Step::Pick("gs://bucket/images/")]);
    assert_ok!(gallery.request_pick().await);

    let result = gallery.confirm_upload().await;

    assert!(matches!(result, Err(GalleryError::Upload(BlobError::Invalid { .. }))));
    assert!(store.uploads().is_empty());
    assert!(gallery.session().is_idle());
}

#[tokio::test]
async fn test_view_serializes_for_shells() {
    let store = RecordingStore::with_images(&["a.png"]);
    let mut gallery = create_default_controller(&store, vec![]);
    assert_ok!(gallery.activate().await);

    let json = serde_json::to_value(gallery.view()).unwrap();

    assert_eq!(json["body"]["kind"], "rows");
    assert_eq!(json["body"]["rows"][0]["items"][0]["image"], "memory://a.png");
    assert_eq!(json["phase"], "Idle");
}

#[tokio::test]
async fn test_local_file_name_with_hash_keeps_full_name() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("holiday#1.png");
    let second = dir.path().join("holiday#2.png");
    tokio::fs::write(&first, b"first").await.unwrap();
    tokio::fs::write(&second, b"second").await.unwrap();

    let store = MemoryStore::new();
    for file in [&first, &second] {
        let mut gallery = GalleryController::new(
            RemoteCollection::new(store.clone(), CollectionConfig::default()),
            PathPicker::new(file),
            FsMediaReader::new(),
            GalleryConfig::default(),
        );
        assert_ok!(gallery.request_pick().await);
        assert_ok!(gallery.confirm_upload().await);
    }

    assert_eq!(store.keys().await, vec!["images/holiday#1.png", "images/holiday#2.png"]);
    assert_eq!(store.get("images/holiday#2.png").await, Some(Bytes::from_static(b"second")));
}
