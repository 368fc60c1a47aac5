/// 상품 등록
pub const INSERT_ITEM: &str = r#"
    INSERT INTO items (id, seller_id, title, description, images, category_id, created_at, updated_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

/// 모든 상품 조회
pub const GET_ALL_ITEMS: &str =
    "SELECT id, seller_id, title, description, images, category_id, created_at, updated_at FROM items ORDER BY created_at DESC";

/// 상품 조회
pub const GET_ITEM: &str =
    "SELECT id, seller_id, title, description, images, category_id, created_at, updated_at FROM items WHERE id = $1";

/// 상품 수정
pub const UPDATE_ITEM: &str = r#"
    UPDATE items
    SET seller_id = $2, title = $3, description = $4, images = $5, category_id = $6, updated_at = $7
    WHERE id = $1
"#;

/// 상품 삭제
pub const DELETE_ITEM: &str = "DELETE FROM items WHERE id = $1";

/// 상품을 참조하는 경매 존재 여부
pub const ITEM_HAS_AUCTIONS: &str =
    "SELECT EXISTS (SELECT 1 FROM auctions WHERE item_id = $1) AS referenced";

/// 경매 등록
pub const INSERT_AUCTION: &str = r#"
    INSERT INTO auctions (id, item_id, currency, start_price_cents, min_increment_cents, reserve_price_cents,
        buy_now_price_cents, starts_at, ends_at, status, auto_extend_seconds, max_extensions,
        extensions_used, current_price_cents, version, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
"#;

/// 모든 경매 조회
pub const GET_ALL_AUCTIONS: &str = r#"
    SELECT id, item_id, currency, start_price_cents, min_increment_cents, reserve_price_cents,
        buy_now_price_cents, starts_at, ends_at, status, auto_extend_seconds, max_extensions,
        extensions_used, current_price_cents, version, created_at
    FROM auctions
    ORDER BY created_at DESC
"#;

/// 경매 조회
pub const GET_AUCTION: &str = r#"
    SELECT id, item_id, currency, start_price_cents, min_increment_cents, reserve_price_cents,
        buy_now_price_cents, starts_at, ends_at, status, auto_extend_seconds, max_extensions,
        extensions_used, current_price_cents, version, created_at
    FROM auctions
    WHERE id = $1
"#;

/// 버전 비교 후 경매 교체 ($16 = 읽을 때의 버전)
pub const SWAP_AUCTION: &str = r#"
    UPDATE auctions
    SET item_id = $2, currency = $3, start_price_cents = $4, min_increment_cents = $5,
        reserve_price_cents = $6, buy_now_price_cents = $7, starts_at = $8, ends_at = $9,
        status = $10, auto_extend_seconds = $11, max_extensions = $12, extensions_used = $13,
        current_price_cents = $14, created_at = $15, version = version + 1
    WHERE id = $1 AND version = $16
    RETURNING version
"#;

/// 경매 삭제
pub const DELETE_AUCTION: &str = "DELETE FROM auctions WHERE id = $1";

/// 경매 존재 여부
pub const AUCTION_EXISTS: &str = "SELECT EXISTS (SELECT 1 FROM auctions WHERE id = $1) AS found";

/// 입찰 기록
pub const INSERT_BID: &str = r#"
    INSERT INTO bids (id, auction_id, user_id, amount_cents, created_at, is_proxy)
    VALUES ($1, $2, $3, $4, $5, $6)
"#;

/// 경매 입찰 이력 조회
pub const GET_AUCTION_BIDS: &str = r#"
    SELECT id, auction_id, user_id, amount_cents, created_at, is_proxy
    FROM bids
    WHERE auction_id = $1
    ORDER BY created_at DESC
"#;

/// 입찰 조회
pub const GET_BID: &str =
    "SELECT id, auction_id, user_id, amount_cents, created_at, is_proxy FROM bids WHERE id = $1";

/// 관심 목록 추가 (이미 있으면 기존 항목 반환)
pub const UPSERT_WATCHLIST: &str = r#"
    INSERT INTO watchlists (user_id, auction_id, created_at)
    VALUES ($1, $2, $3)
    ON CONFLICT (user_id, auction_id) DO UPDATE SET user_id = EXCLUDED.user_id
    RETURNING user_id, auction_id, created_at
"#;

/// 관심 목록 삭제
pub const DELETE_WATCHLIST: &str = "DELETE FROM watchlists WHERE user_id = $1 AND auction_id = $2";

/// 사용자 관심 목록 조회
pub const GET_USER_WATCHLISTS: &str =
    "SELECT user_id, auction_id, created_at FROM watchlists WHERE user_id = $1 ORDER BY created_at DESC";

/// 감사 기록 추가
pub const INSERT_SYSTEM_EVENT: &str = r#"
    INSERT INTO system_events (id, actor_user_id, action, entity_type, entity_id, meta, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7)
"#;

/// 엔티티 감사 기록 조회
pub const GET_SYSTEM_EVENTS: &str = r#"
    SELECT id, actor_user_id, action, entity_type, entity_id, meta, created_at
    FROM system_events
    WHERE entity_type = $1 AND entity_id = $2
    ORDER BY created_at ASC
"#;
