//! Integration tests for full reconciliation passes.
//!
//! These drive [`sync_library`] against both the in-memory store and a real
//! temporary directory, and check the resulting `shortcuts.vdf` bytes
//! through the public codec.

use std::path::PathBuf;

use librarian::application::sync_library::{sync_library, SyncError, SyncOptions};
use librarian::infrastructure::storage::library::{load_library, save_library};
use librarian::infrastructure::storage::mock::MemoryStoreFiles;
use librarian::infrastructure::storage::shortcut_store::FsStoreFiles;
use librarian_core::{
    read_shortcuts, write_shortcuts, AppId, Category, CataloguePointer, Launcher, Library,
    RomEntry, Shortcut,
};
use uuid::Uuid;

// ── Helpers ───────────────────────────────────────────────────────────────────

fn store_path() -> PathBuf {
    PathBuf::from("/steam/userdata/12345678/config/shortcuts.vdf")
}

fn options() -> SyncOptions {
    SyncOptions {
        store_path: store_path(),
        backup_extension: Some("bak".to_string()),
    }
}

fn foo() -> Shortcut {
    Shortcut {
        app_id: 111,
        app_name: "Foo".to_string(),
        exe: "\"/usr/bin/foo\"".to_string(),
        tags: vec!["Old".to_string()],
        last_play_time: 1_600_000_000,
        ..Default::default()
    }
}

/// A library declaring `Bar` (launched directly) in the `Tools` category.
fn bar_library() -> Library {
    let mut library = Library::default();
    library.launchers.insert(
        "bar".to_string(),
        Launcher {
            executable: "/bin/bar".to_string(),
            arguments: Vec::new(),
            open_vr: false,
        },
    );
    library.categories.insert(
        "Tools".to_string(),
        Category {
            default_launcher: Some("bar".to_string()),
            entries: vec![RomEntry {
                name: "Bar".to_string(),
                ..Default::default()
            }],
        },
    );
    library
}

// ── Scenarios ─────────────────────────────────────────────────────────────────

#[test]
fn test_claimed_shortcut_dropped_from_catalogue_is_kept() {
    // Arrange: the store still has Foo and the catalogue still points at it,
    // but no catalogue entry generates it.
    let files = MemoryStoreFiles::new();
    files.insert(&store_path(), write_shortcuts(&[foo()]));
    let mut library = Library::default();
    library.pointers.push(CataloguePointer::new("111", "Foo"));

    // Act
    let outcome = sync_library(&files, &options(), &mut library).unwrap();

    // Assert
    assert!(outcome.report.deleted.is_empty());
    assert_eq!(library.pointers, vec![CataloguePointer::new("111", "Foo")]);
    assert_eq!(outcome.shortcuts, vec![foo()]);
    assert!(!outcome.written, "nothing changed, nothing written");
}

#[test]
fn test_new_declared_entry_is_appended_after_existing_shortcuts() {
    let files = MemoryStoreFiles::new();
    files.insert(&store_path(), write_shortcuts(&[foo()]));
    let mut library = bar_library();

    let outcome = sync_library(&files, &options(), &mut library).unwrap();

    let stored = read_shortcuts(&files.contents(&store_path()).unwrap()).unwrap();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[0], foo());
    let bar = &stored[1];
    assert_eq!(bar.app_id, AppId::derive("/bin/bar", "Bar").shortcut_id());
    assert_eq!(bar.app_id, 3_054_393_680);
    assert_eq!(bar.app_name, "Bar");
    assert_eq!(bar.exe, "\"/bin/bar\"");
    assert_eq!(bar.tags, vec!["Tools"]);
    assert_eq!(bar.last_play_time, 0);
    assert!(bar.flags.allow_overlay);
    assert!(bar.flags.allow_desktop_config);

    // Foo was never claimed, so it is adopted.
    assert_eq!(outcome.report.adopted, vec![CataloguePointer::new("111", "Foo")]);
    assert_eq!(outcome.report.created, vec!["Bar"]);
    // The original store is preserved as a backup.
    assert_eq!(
        files.contents(&options().backup_path().unwrap()),
        Some(write_shortcuts(&[foo()]))
    );
}

#[test]
fn test_shortcut_removed_in_steam_forgets_pointer() {
    let files = MemoryStoreFiles::new();
    files.insert(&store_path(), write_shortcuts(&[]));
    let mut library = Library::default();
    library.pointers.push(CataloguePointer::new("111", "Foo"));

    let outcome = sync_library(&files, &options(), &mut library).unwrap();

    assert_eq!(outcome.report.deleted, vec![CataloguePointer::new("111", "Foo")]);
    assert!(library.pointers.is_empty());
}

#[test]
fn test_play_history_survives_relaunch_changes() {
    // Arrange: Bar was created on an earlier run and played since.
    let files = MemoryStoreFiles::new();
    let mut played = Shortcut {
        app_id: 3_054_393_680,
        app_name: "Bar".to_string(),
        exe: "\"/bin/bar\"".to_string(),
        start_dir: "\"/bin\"".to_string(),
        tags: vec!["Tools".to_string(), "Favorites".to_string()],
        ..Default::default()
    };
    played.last_play_time = 1_700_000_000;
    played.flags.is_hidden = true;
    files.insert(&store_path(), write_shortcuts(&[played]));

    let mut library = bar_library();
    library.launchers.get_mut("bar").unwrap().arguments = vec!["--windowed".to_string()];

    // Act
    let outcome = sync_library(&files, &options(), &mut library).unwrap();

    // Assert
    let bar = &outcome.shortcuts[0];
    assert_eq!(outcome.shortcuts.len(), 1);
    assert_eq!(bar.launch_options.as_deref(), Some("--windowed"));
    assert_eq!(bar.last_play_time, 1_700_000_000);
    assert!(bar.flags.is_hidden);
    assert_eq!(bar.tags, vec!["Tools", "Favorites"]);
    assert_eq!(outcome.report.inherited, vec!["Bar"]);
}

#[test]
fn test_repeated_passes_are_byte_identical() {
    let files = MemoryStoreFiles::new();
    files.insert(&store_path(), write_shortcuts(&[foo()]));
    let mut library = bar_library();

    sync_library(&files, &options(), &mut library).unwrap();
    let first = files.contents(&store_path()).unwrap();
    let pointers = library.pointers.clone();
    let second_outcome = sync_library(&files, &options(), &mut library).unwrap();

    assert_eq!(files.contents(&store_path()).unwrap(), first);
    assert_eq!(library.pointers, pointers);
    assert!(!second_outcome.written);
    assert_eq!(files.write_count(), 1);
}

#[test]
fn test_unknown_launcher_aborts_before_touching_store() {
    let files = MemoryStoreFiles::new();
    files.insert(&store_path(), write_shortcuts(&[foo()]));
    let mut library = bar_library();
    library.categories.get_mut("Tools").unwrap().default_launcher = Some("ghost".to_string());

    let err = sync_library(&files, &options(), &mut library).unwrap_err();

    assert!(matches!(err, SyncError::Build(_)));
    assert!(err.to_string().contains("ghost"));
    assert_eq!(files.write_count(), 0);
}

#[test]
fn test_failed_write_keeps_library_pointers() {
    let files = MemoryStoreFiles::new();
    files.insert(&store_path(), write_shortcuts(&[foo()]));
    files.fail_writes();
    let mut library = bar_library();

    let err = sync_library(&files, &options(), &mut library).unwrap_err();

    assert!(matches!(err, SyncError::Write { .. }));
    assert!(library.pointers.is_empty());
}

#[test]
fn test_truncated_store_error_names_file() {
    let files = MemoryStoreFiles::new();
    let mut bytes = write_shortcuts(&[foo()]);
    bytes.truncate(bytes.len() - 5);
    files.insert(&store_path(), bytes);

    let err = sync_library(&files, &options(), &mut bar_library()).unwrap_err();

    assert!(matches!(err, SyncError::Decode { .. }));
    assert!(err.to_string().contains("shortcuts.vdf"));
}

// ── Real filesystem ───────────────────────────────────────────────────────────

#[test]
fn test_full_pass_on_disk_with_library_file() {
    // Arrange
    let dir = std::env::temp_dir().join(format!("librarian_it_{}", Uuid::new_v4()));
    let store = dir.join("userdata").join("1").join("config").join("shortcuts.vdf");
    let library_path = dir.join("library.json");
    save_library(&library_path, &bar_library()).unwrap();
    let options = SyncOptions {
        store_path: store.clone(),
        backup_extension: Some("bak".to_string()),
    };

    // Act
    let mut library = load_library(&library_path).unwrap();
    sync_library(&FsStoreFiles::new(), &options, &mut library).unwrap();
    save_library(&library_path, &library).unwrap();

    // Remove Bar from the catalogue; it should be adopted, not deleted.
    let mut library = load_library(&library_path).unwrap();
    library.categories.clear();
    sync_library(&FsStoreFiles::new(), &options, &mut library).unwrap();

    // Assert
    let stored = read_shortcuts(&std::fs::read(&store).unwrap()).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].app_name, "Bar");
    assert_eq!(
        library.pointers,
        vec![CataloguePointer::new("3054393680", "Bar")]
    );
    assert!(!store.with_file_name("shortcuts.vdf.bak").exists());

    // Cleanup
    std::fs::remove_dir_all(&dir).ok();
}
