use super::*;

fn position(z_index: Option<i32>) -> PositionInput {
    PositionInput { x: 10.0, y: 20.0, width: 200.0, height: 150.0, z_index }
}

// =============================================================
// Validation
// =============================================================

#[test]
fn content_must_match_kind() {
    assert!(check_content(ItemKind::ImageUrl, "https://example.com/a.png").is_ok());
    assert!(check_content(ItemKind::ImageUrl, "http://example.com/a.png").is_ok());
    assert!(check_content(ItemKind::ImageUpload, "data:image/png;base64,AAAA").is_ok());

    let err = check_content(ItemKind::ImageUrl, "ftp://example.com/a.png").unwrap_err();
    assert_eq!(err.to_string(), "image_url content must be an http(s) URL");
    assert!(check_content(ItemKind::ImageUpload, "https://example.com/a.png").is_err());
}

#[test]
fn canvas_dimensions_must_be_positive_and_finite() {
    for bad in [0.0, -5.0, f64::NAN, f64::INFINITY] {
        let patch = BoardPatch { canvas_width: Some(bad), ..BoardPatch::default() };
        assert!(validate_board_patch(&patch).is_err(), "width {bad}");
        let patch = BoardPatch { canvas_height: Some(bad), ..BoardPatch::default() };
        assert!(validate_board_patch(&patch).is_err(), "height {bad}");
    }
    let patch = BoardPatch { canvas_width: Some(1600.0), canvas_height: Some(900.0), ..BoardPatch::default() };
    assert!(validate_board_patch(&patch).is_ok());
    assert!(validate_board_patch(&BoardPatch::default()).is_ok());
}

#[test]
fn position_keeps_explicit_z() {
    let g = position(Some(7)).resolve(|| 99).unwrap();
    assert_eq!(g.z_index, 7);
    assert_eq!((g.x, g.y, g.width, g.height), (10.0, 20.0, 200.0, 150.0));
}

#[test]
fn position_without_z_uses_fallback() {
    let g = position(None).resolve(|| zorder::next_z_index([1, 4, 2])).unwrap();
    assert_eq!(g.z_index, 5);
}

#[test]
fn invalid_position_rejected() {
    let mut p = position(Some(1));
    p.width = 0.0;
    assert!(matches!(p.resolve(|| 1), Err(MoodboardError::Validation(_))));
    assert!(position(Some(0)).resolve(|| 1).is_err());
    let mut p = position(None);
    p.x = f64::NAN;
    assert!(p.resolve(|| 1).is_err());
}

#[test]
fn position_input_accepts_missing_z() {
    let p: PositionInput = serde_json::from_str(r#"{"x":1,"y":2,"width":3,"height":4}"#).unwrap();
    assert_eq!(p.z_index, None);
    let p: PositionInput = serde_json::from_str(r#"{"x":1,"y":2,"width":3,"height":4,"zIndex":6}"#).unwrap();
    assert_eq!(p.z_index, Some(6));
}

#[test]
fn item_record_without_full_geometry_has_null_position() {
    let record = ItemRecord {
        id: Uuid::nil(),
        board_id: Uuid::nil(),
        kind: "image_upload".into(),
        content: "data:image/png;base64,AAAA".into(),
        tags: Json(vec!["travel".into()]),
        x: Some(1.0),
        y: Some(2.0),
        width: None,
        height: None,
        z_index: Some(1),
        created_at: Utc::now(),
        updated_at: Utc::now(),
    };
    let item = MoodBoardItem::from(record);
    assert!(item.item.position.is_none());

    let value = serde_json::to_value(&item).unwrap();
    assert_eq!(value["type"], "image_upload");
    assert_eq!(value["boardId"], Uuid::nil().to_string());
    assert!(value["position"].is_null());
    assert!(value.get("createdAt").is_some());
}

#[test]
fn error_codes() {
    assert_eq!(MoodboardError::BoardExists(2025).error_code(), "BOARD_EXISTS");
    assert_eq!(MoodboardError::BoardNotFound(Uuid::nil()).error_code(), "BOARD_NOT_FOUND");
    assert_eq!(MoodboardError::ItemNotFound(Uuid::nil()).error_code(), "ITEM_NOT_FOUND");
}

#[tokio::test]
async fn bad_content_rejected_before_database() {
    let state = crate::state::test_helpers::test_app_state();
    let item = NewItem { kind: ItemKind::ImageUrl, content: "not a url".into(), tags: Vec::new(), position: None };
    let err = create_item(&state.pool, Uuid::new_v4(), Uuid::new_v4(), item).await.unwrap_err();
    assert!(matches!(err, MoodboardError::Validation(_)));
}

// =============================================================
// Live database
// =============================================================

#[cfg(feature = "live-db-tests")]
mod live {
    use super::*;
    use crate::state::test_helpers::{integration_pool, seed_user};

    fn url_item(position: Option<PositionInput>) -> NewItem {
        NewItem {
            kind: ItemKind::ImageUrl,
            content: "https://example.com/pic.jpg".into(),
            tags: vec!["goals".into()],
            position,
        }
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn board_for_year_is_idempotent() {
        let pool = integration_pool().await;
        let user = seed_user(&pool).await;
        let first = board_for_year(&pool, user, 2025).await.expect("get-or-create should succeed");
        let second = board_for_year(&pool, user, 2025).await.expect("get-or-create should succeed");
        assert_eq!(first.id, second.id);
        assert_eq!((first.canvas_width, first.canvas_height), (1200.0, 800.0));
        assert_eq!(list_boards(&pool, user).await.expect("list should succeed").len(), 1);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn duplicate_year_create_conflicts() {
        let pool = integration_pool().await;
        let user = seed_user(&pool).await;
        let board = NewBoard { year: Some(2026), ..NewBoard::default() };
        create_board(&pool, user, board.clone(), 2025).await.expect("first create should succeed");
        assert!(matches!(
            create_board(&pool, user, board, 2025).await,
            Err(MoodboardError::BoardExists(2026))
        ));
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn items_stack_in_creation_order() {
        let pool = integration_pool().await;
        let user = seed_user(&pool).await;
        let board = board_for_year(&pool, user, 2025).await.expect("board");

        let placed = create_item(&pool, user, board.id, url_item(None)).await.expect("create should succeed");
        let g = placed.item.position.expect("server placed the item");
        assert!((0.0..600.0).contains(&g.x));
        assert!((0.0..400.0).contains(&g.y));
        assert!((200.0..350.0).contains(&g.width));
        assert_eq!(g.z_index, 1);

        let second = create_item(&pool, user, board.id, url_item(Some(position(None)))).await.expect("create");
        assert_eq!(second.item.position.map(|g| g.z_index), Some(2));

        let ids: Vec<_> = list_items(&pool, user, board.id).await.expect("list").iter().map(|i| i.item.id).collect();
        assert_eq!(ids, [placed.item.id, second.item.id]);
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn item_patch_keeps_layer_without_z() {
        let pool = integration_pool().await;
        let user = seed_user(&pool).await;
        let board = board_for_year(&pool, user, 2025).await.expect("board");
        let item = create_item(&pool, user, board.id, url_item(Some(position(Some(4))))).await.expect("create");

        let moved = PositionInput { x: 300.0, ..position(None) };
        let patch = ItemPatch { position: Some(moved), ..ItemPatch::default() };
        let updated = update_item(&pool, user, board.id, item.item.id, patch).await.expect("update");
        let g = updated.item.position.expect("position kept");
        assert!((g.x - 300.0).abs() < f64::EPSILON);
        assert_eq!(g.z_index, 4);

        let patch = ItemPatch { kind: Some(ItemKind::ImageUpload), ..ItemPatch::default() };
        assert!(matches!(
            update_item(&pool, user, board.id, item.item.id, patch).await,
            Err(MoodboardError::Validation(_))
        ));
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn foreign_board_is_not_found() {
        let pool = integration_pool().await;
        let owner = seed_user(&pool).await;
        let stranger = seed_user(&pool).await;
        let board = board_for_year(&pool, owner, 2025).await.expect("board");
        assert!(matches!(get_board(&pool, stranger, board.id).await, Err(MoodboardError::BoardNotFound(_))));
        assert!(matches!(
            create_item(&pool, stranger, board.id, url_item(None)).await,
            Err(MoodboardError::BoardNotFound(_))
        ));
        assert!(matches!(delete_board(&pool, stranger, board.id).await, Err(MoodboardError::BoardNotFound(_))));
    }

    #[tokio::test]
    #[ignore = "requires TEST_DATABASE_URL/live Postgres"]
    async fn canvas_resize_persists() {
        let pool = integration_pool().await;
        let user = seed_user(&pool).await;
        let board = board_for_year(&pool, user, 2025).await.expect("board");
        let patch = BoardPatch { canvas_width: Some(2400.0), canvas_height: Some(1600.0), ..BoardPatch::default() };
        let resized = update_board(&pool, user, board.id, patch).await.expect("update");
        assert_eq!((resized.canvas_width, resized.canvas_height), (2400.0, 1600.0));
    }
}
