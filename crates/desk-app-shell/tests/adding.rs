use desk_app_shell::{
    AddError, DesktopShell, ShellConfig, StateBundle, StateValue, PENDING_ADD_CELL_X,
    PENDING_ADD_COUNT_X, PENDING_ADD_COUNT_Y, PENDING_ADD_OCCUPIED, PENDING_ADD_SCREEN,
};
use desk_core::{DrawerAdapter, HostError, MemorySurface, Notice, SurfaceEvent};
use desk_grid::{AllocationExhausted, CellSpan};
use desk_testing::{shortcut, shortcut_row, RecordingHost};

fn shell_with(config: ShellConfig, host: RecordingHost) -> DesktopShell<MemorySurface, RecordingHost> {
    DesktopShell::new(config.memory_surface(), host, config)
}

fn one_screen() -> ShellConfig {
    ShellConfig {
        screen_count: 1,
        ..ShellConfig::default()
    }
}

fn filled(config: ShellConfig, host: RecordingHost) -> DesktopShell<MemorySurface, RecordingHost> {
    let mut shell = shell_with(config, host);
    shell.start_binding(shortcut_row(1, 16, 0, 4), Vec::new(), DrawerAdapter::default());
    shell.pump();
    shell.surface_mut().take_events();
    shell
}

#[test]
fn full_pending_screen_falls_back_to_the_next_screen() {
    let mut shell = filled(ShellConfig::default(), RecordingHost::new());
    shell.begin_add(0, 1, 1).expect("screen 0 exists");

    let span = shell.find_slot(None, 1, 1).expect("screen 1 is empty");
    assert_eq!(span, CellSpan::single(1, 0, 0));

    let record = shell.add_shortcut(shortcut(50, 0, 0, 0), None).expect("room on screen 1");
    assert_eq!((record.screen, record.cell), (1, Some((0, 0))));
    assert_eq!(shell.surface().placed_on(1).count(), 1);
    assert_eq!(shell.pending_add(), None);
}

#[test]
fn no_room_anywhere_shows_a_notice() {
    let shell = filled(one_screen(), RecordingHost::new());

    assert_eq!(
        shell.find_slot(None, 1, 1),
        Err(AllocationExhausted { span_x: 1, span_y: 1 })
    );
    assert_eq!(
        shell.surface().events(),
        &[SurfaceEvent::Notice(Notice::OutOfSpace)]
    );
}

#[test]
fn widgets_are_sized_from_the_host_minimum() {
    let mut host = RecordingHost::new();
    host.register_sized(9, 160, 100);
    let mut shell = shell_with(ShellConfig::default(), host);

    let record = shell.add_widget(9, None).expect("empty desk");
    assert_eq!(record.span(), CellSpan::new(0, 0, 0, 3, 2));
    assert!(record.host_view.is_some());
    assert_eq!(shell.host().created(), &[9]);
    assert_eq!(shell.surface().placed().len(), 1);
}

#[test]
fn widgets_that_cannot_be_placed_give_their_id_back() {
    let mut host = RecordingHost::with_widgets([9]);
    host.register_sized(10, 10, 10);
    let mut shell = filled(one_screen(), host);

    assert!(matches!(shell.add_widget(9, None), Err(AddError::Exhausted(_))));
    assert_eq!(
        shell.add_widget(42, None),
        Err(AddError::Host(HostError::UnknownWidget(42)))
    );
    assert_eq!(shell.host().deleted(), &[9, 42]);
    assert!(shell.host().is_registered(10));
    assert!(shell.host().created().is_empty());
}

#[test]
fn interrupted_placement_survives_a_restart() {
    let mut before = shell_with(ShellConfig::default(), RecordingHost::new());
    before.start_binding(shortcut_row(1, 3, 0, 4), Vec::new(), DrawerAdapter::default());
    before.pump();
    before.begin_add(0, 3, 0).expect("screen 0 exists");
    let bundle = before.save_state();
    before.destroy();

    assert_eq!(bundle.index(PENDING_ADD_SCREEN), Some(0));
    assert_eq!(bundle.index(PENDING_ADD_CELL_X), Some(3));
    let mask = bundle.mask(PENDING_ADD_OCCUPIED).expect("mask saved");
    assert_eq!(mask.iter().filter(|cell| **cell).count(), 3);
    assert!(mask[..3].iter().all(|cell| *cell));

    let mut after = shell_with(ShellConfig::default(), RecordingHost::new());
    after.restore_state(&bundle);
    assert!(after.is_restoring());
    assert_eq!(after.pending_add().map(|info| info.cell_x), Some(3));

    let record = after.add_shortcut(shortcut(50, 0, 0, 0), None).expect("saved grid has room");
    assert_eq!(record.cell, Some((3, 0)));
    assert!(after.surface().placed().is_empty(), "restoring adds wait for binding");

    after.start_binding(Vec::new(), Vec::new(), DrawerAdapter::default());
    assert!(!after.is_restoring());
    after.pump();
    assert_eq!(after.surface().placed().len(), 1);
    assert_eq!(after.surface().placed()[0].span, CellSpan::single(0, 3, 0));
}

#[test]
fn saved_mask_only_applies_while_restoring() {
    let mut bundle = StateBundle::new();
    bundle.put_int(PENDING_ADD_SCREEN, 0);
    bundle.put_int(PENDING_ADD_COUNT_X, 4);
    bundle.put_int(PENDING_ADD_COUNT_Y, 4);
    bundle.put(PENDING_ADD_OCCUPIED, StateValue::Mask(vec![true; 16]));

    let mut shell = shell_with(ShellConfig::default(), RecordingHost::new());
    shell.restore_state(&bundle);
    assert!(shell.is_restoring());
    assert_eq!(shell.find_slot(None, 1, 1), Ok(CellSpan::single(1, 0, 0)));

    shell.start_binding(Vec::new(), Vec::new(), DrawerAdapter::default());
    shell.pump();
    assert_eq!(shell.find_slot(None, 1, 1), Ok(CellSpan::single(0, 0, 0)));
}

#[test]
fn mismatched_saved_mask_is_dropped() {
    let mut bundle = StateBundle::new();
    bundle.put_int(PENDING_ADD_SCREEN, 0);
    bundle.put_int(PENDING_ADD_COUNT_X, 4);
    bundle.put_int(PENDING_ADD_COUNT_Y, 4);
    bundle.put(PENDING_ADD_OCCUPIED, StateValue::Mask(vec![true; 3]));

    let mut shell = shell_with(ShellConfig::default(), RecordingHost::new());
    shell.restore_state(&bundle);
    assert!(!shell.is_restoring());
    assert_eq!(shell.pending_add(), None);
}

#[test]
fn saved_placement_from_another_grid_shape_is_dropped() {
    let mut bundle = StateBundle::new();
    bundle.put_int(PENDING_ADD_SCREEN, 0);
    bundle.put_int(PENDING_ADD_COUNT_X, 2);
    bundle.put_int(PENDING_ADD_COUNT_Y, 8);
    bundle.put_int(PENDING_ADD_CELL_X, 1);
    bundle.put(PENDING_ADD_OCCUPIED, StateValue::Mask(vec![false; 16]));

    let mut shell = shell_with(ShellConfig::default(), RecordingHost::new());
    shell.restore_state(&bundle);
    assert!(!shell.is_restoring());
    assert_eq!(shell.pending_add(), None);

    let record = shell.add_shortcut(shortcut(50, 0, 0, 0), None).expect("empty desk");
    assert_eq!((record.screen, record.cell), (0, Some((0, 0))));
    assert_eq!(shell.surface().placed()[0].span, CellSpan::single(0, 0, 0));
    assert_eq!(shell.find_slot(None, 1, 1), Ok(CellSpan::single(0, 1, 0)));
}

#[test]
fn saved_placement_on_a_missing_screen_is_dropped() {
    let mut bundle = StateBundle::new();
    bundle.put_int(PENDING_ADD_SCREEN, 9);
    bundle.put_int(PENDING_ADD_COUNT_X, 4);
    bundle.put_int(PENDING_ADD_COUNT_Y, 4);
    bundle.put(PENDING_ADD_OCCUPIED, StateValue::Mask(vec![true; 16]));

    let mut shell = shell_with(ShellConfig::default(), RecordingHost::new());
    shell.restore_state(&bundle);
    assert!(!shell.is_restoring());
    assert_eq!(shell.find_slot(None, 1, 1), Ok(CellSpan::single(0, 0, 0)));
}

#[test]
fn huge_saved_counts_do_not_panic() {
    let mut bundle = StateBundle::new();
    bundle.put_int(PENDING_ADD_SCREEN, 0);
    bundle.put_int(PENDING_ADD_COUNT_X, u64::MAX / 2);
    bundle.put_int(PENDING_ADD_COUNT_Y, 4);
    bundle.put(PENDING_ADD_OCCUPIED, StateValue::Mask(vec![true; 16]));

    let mut shell = shell_with(ShellConfig::default(), RecordingHost::new());
    shell.restore_state(&bundle);
    assert!(!shell.is_restoring());
    assert_eq!(shell.pending_add(), None);
}
