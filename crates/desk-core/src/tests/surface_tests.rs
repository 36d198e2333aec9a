use super::*;
use crate::record::ItemKind;

fn folder(id: FolderId) -> ItemRecord {
    ItemRecord::new(
        id,
        0,
        ItemKind::UserFolder(FolderInfo {
            id,
            title: format!("folder {id}"),
            contents: Vec::new(),
        }),
    )
}

#[test]
fn reopened_folder_becomes_the_most_recent() {
    let mut surface = MemorySurface::new(GridSize::new(4, 4), 1);
    surface.open_folder(&folder(1));
    surface.open_folder(&folder(2));
    surface.open_folder(&folder(1));
    assert_eq!(surface.open_folder_ids(), vec![2, 1]);

    surface.focus_open_folder();
    assert_eq!(surface.take_events().last(), Some(&SurfaceEvent::FolderFocused(1)));
}
