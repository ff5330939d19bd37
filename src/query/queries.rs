/// Active auctions with their listing summary, soonest ending first
pub const LIST_ACTIVE_AUCTIONS: &str = r#"
    SELECT a.*, l.title AS listing_title, l.image_urls AS listing_image_urls, l.price AS listing_price
    FROM auctions a
    JOIN listings l ON l.id = a.listing_id
    WHERE a.status = 'active'
    ORDER BY a.end_time ASC
    LIMIT 50
"#;

/// One auction with its listing summary
pub const GET_AUCTION: &str = r#"
    SELECT a.*, l.title AS listing_title, l.image_urls AS listing_image_urls, l.price AS listing_price
    FROM auctions a
    JOIN listings l ON l.id = a.listing_id
    WHERE a.id = $1
"#;

/// Bid history, leading bid first
pub const GET_BID_HISTORY: &str = r#"
    SELECT b.id, b.auction_id, b.bidder_id, b.bid_amount, b.created_at,
           u.username AS bidder_username
    FROM bids b
    LEFT JOIN users u ON u.id = b.bidder_id
    WHERE b.auction_id = $1
    ORDER BY b.bid_amount DESC
"#;

/// Current leading amount for one auction
pub const GET_HIGHEST_BID: &str =
    "SELECT MAX(bid_amount) AS highest_bid FROM bids WHERE auction_id = $1";

/// Marketplace browse, newest first
pub const LIST_LISTINGS: &str = r#"
    SELECT * FROM listings
    WHERE status = $1 AND is_auction = FALSE
    ORDER BY created_at DESC
    LIMIT 50
"#;

/// Marketplace browse filtered by category
pub const LIST_LISTINGS_BY_CATEGORY: &str = r#"
    SELECT * FROM listings
    WHERE status = $1 AND is_auction = FALSE AND category = $2
    ORDER BY created_at DESC
    LIMIT 50
"#;

/// Upcoming events, soonest first
pub const LIST_UPCOMING_EVENTS: &str = r#"
    SELECT * FROM events
    WHERE status = 'upcoming'
    ORDER BY event_date ASC
    LIMIT 50
"#;

/// One event
pub const GET_EVENT: &str = "SELECT * FROM events WHERE id = $1";

/// Attendees of one event, in RSVP order
pub const LIST_EVENT_ATTENDEES: &str = r#"
    SELECT ea.id, ea.event_id, ea.user_id, ea.attended, ea.created_at,
           u.username AS attendee_username
    FROM event_attendees ea
    LEFT JOIN users u ON u.id = ea.user_id
    WHERE ea.event_id = $1
    ORDER BY ea.created_at ASC
"#;

/// Community feed, newest first
pub const LIST_POSTS: &str = r#"
    SELECT p.id, p.user_id, p.title, p.content, p.likes_count, p.replies_count, p.created_at,
           u.username AS author_username
    FROM community_posts p
    LEFT JOIN users u ON u.id = p.user_id
    ORDER BY p.created_at DESC
    LIMIT 50
"#;

/// Profile row for the dashboard
pub const GET_PROFILE: &str = "SELECT username, full_name FROM users WHERE id = $1";

/// Caller's recent fixed-price listings
pub const MY_LISTINGS: &str = r#"
    SELECT * FROM listings
    WHERE user_id = $1 AND is_auction = FALSE
    ORDER BY created_at DESC
    LIMIT 5
"#;

/// Caller's recent auctions with listing summary
pub const MY_AUCTIONS: &str = r#"
    SELECT a.*, l.title AS listing_title, l.image_urls AS listing_image_urls, l.price AS listing_price
    FROM auctions a
    JOIN listings l ON l.id = a.listing_id
    WHERE a.seller_id = $1
    ORDER BY a.end_time DESC
    LIMIT 5
"#;

/// Caller's organized events
pub const MY_EVENTS: &str = r#"
    SELECT * FROM events
    WHERE organizer_id = $1
    ORDER BY event_date ASC
    LIMIT 5
"#;

/// Caller's RSVPs with the event they belong to
pub const MY_RSVPS: &str = r#"
    SELECT ea.id AS rsvp_id, ea.created_at AS rsvp_created_at, e.*
    FROM event_attendees ea
    JOIN events e ON e.id = ea.event_id
    WHERE ea.user_id = $1
    ORDER BY ea.created_at DESC
"#;
