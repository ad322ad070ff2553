use kernel_sync::SyncOnceCell;

#[test]
fn first_set_wins() {
    let cell = SyncOnceCell::new();
    assert!(cell.get().is_none());
    assert_eq!(cell.set(1), Ok(()));
    assert_eq!(cell.set(2), Err(2));
    assert_eq!(cell.get(), Some(&1));
}

#[test]
fn get_or_init_runs_once() {
    let cell = SyncOnceCell::new();
    let mut runs = 0;
    assert_eq!(
        *cell.get_or_init(|| {
            runs += 1;
            "abort"
        }),
        "abort"
    );
    assert_eq!(*cell.get_or_init(|| "other"), "abort");
    assert_eq!(runs, 1);
}

#[test]
fn holds_trait_objects() {
    trait Named {
        fn name(&self) -> &'static str;
    }
    struct Console;
    impl Named for Console {
        fn name(&self) -> &'static str {
            "console"
        }
    }
    static CONSOLE: Console = Console;

    let cell: SyncOnceCell<&'static (dyn Named + Sync)> = SyncOnceCell::new();
    assert!(cell.set(&CONSOLE).is_ok());
    assert_eq!(cell.get().map(|n| n.name()), Some("console"));
}
