use chrono::{Duration, Utc};
use std::sync::Arc;

use thriftup_service::auctions::{status, Auction};
use thriftup_service::bidding::commands::{
    handle_buy_now, handle_place_bid, BuyNowCommand, PlaceBidCommand,
};
use thriftup_service::error::MarketError;
use thriftup_service::ledger::InMemoryLedger;

const SELLER: i64 = 1;
const BIDDER_ONE: i64 = 2;
const BIDDER_TWO: i64 = 3;

/// An auction whose window is open: starting price $50.00, increment $5.00.
fn open_auction(id: i64) -> Auction {
    let now = Utc::now();
    Auction {
        id,
        listing_id: id,
        seller_id: SELLER,
        starting_price: 5000,
        current_bid: None,
        highest_bidder_id: None,
        reserve_price: None,
        buy_now_price: None,
        min_bid_increment: 500,
        start_time: now - Duration::hours(1),
        end_time: now + Duration::hours(2),
        status: status::ACTIVE.to_string(),
        created_at: now,
    }
}

fn bid(auction_id: i64, amount: i64) -> PlaceBidCommand {
    PlaceBidCommand {
        auction_id,
        bid_amount: amount,
    }
}

#[tokio::test]
async fn first_bid_at_exactly_starting_price_is_accepted() {
    let ledger = InMemoryLedger::new();
    ledger.insert_auction(open_auction(1));

    let placed = handle_place_bid(bid(1, 5000), BIDDER_ONE, &ledger)
        .await
        .unwrap();
    assert_eq!(placed.bid_amount, 5000);
    assert_eq!(placed.bidder_id, BIDDER_ONE);

    let auction = ledger.auction(1).unwrap();
    assert_eq!(auction.current_bid, Some(5000));
    assert_eq!(auction.highest_bidder_id, Some(BIDDER_ONE));
}

#[tokio::test]
async fn later_bids_must_clear_the_increment() {
    let ledger = InMemoryLedger::new();
    ledger.insert_auction(open_auction(1));

    handle_place_bid(bid(1, 5000), BIDDER_ONE, &ledger)
        .await
        .unwrap();

    // $53.00 against a $55.00 minimum
    let err = handle_place_bid(bid(1, 5300), BIDDER_TWO, &ledger)
        .await
        .unwrap_err();
    match err {
        MarketError::BidTooLow { minimum } => assert_eq!(minimum, 5500),
        other => panic!("expected BidTooLow, got {other:?}"),
    }

    // a rejected bid leaves no trace
    assert_eq!(ledger.bids_for(1).len(), 1);
    let auction = ledger.auction(1).unwrap();
    assert_eq!(auction.current_bid, Some(5000));
    assert_eq!(auction.highest_bidder_id, Some(BIDDER_ONE));

    handle_place_bid(bid(1, 5500), BIDDER_TWO, &ledger)
        .await
        .unwrap();
    let auction = ledger.auction(1).unwrap();
    assert_eq!(auction.current_bid, Some(5500));
    assert_eq!(auction.highest_bidder_id, Some(BIDDER_TWO));
}

#[tokio::test]
async fn bid_log_maximum_always_equals_current_bid() {
    let ledger = InMemoryLedger::new();
    ledger.insert_auction(open_auction(1));

    for (bidder, amount) in [(BIDDER_ONE, 5000), (BIDDER_TWO, 5500), (BIDDER_ONE, 6000)] {
        handle_place_bid(bid(1, amount), bidder, &ledger)
            .await
            .unwrap();
        let auction = ledger.auction(1).unwrap();
        let log_max = ledger
            .bids_for(1)
            .iter()
            .map(|b| b.bid_amount)
            .max()
            .unwrap();
        assert_eq!(auction.current_bid, Some(log_max));
    }
}

#[tokio::test]
async fn seller_cannot_bid_on_own_auction() {
    let ledger = InMemoryLedger::new();
    ledger.insert_auction(open_auction(1));

    let err = handle_place_bid(bid(1, 99_999), SELLER, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::SelfBid));
    assert!(ledger.bids_for(1).is_empty());
}

#[tokio::test]
async fn missing_auction_is_not_found() {
    let ledger = InMemoryLedger::new();
    let err = handle_place_bid(bid(42, 5000), BIDDER_ONE, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::NotFound(_)));
}

#[tokio::test]
async fn non_positive_amounts_are_rejected() {
    let ledger = InMemoryLedger::new();
    ledger.insert_auction(open_auction(1));

    let err = handle_place_bid(bid(1, 0), BIDDER_ONE, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::Validation(_)));
}

#[tokio::test]
async fn expired_auction_rejects_bids_even_with_stale_label() {
    let ledger = InMemoryLedger::new();
    let mut auction = open_auction(1);
    // the sweeper has not flipped the label yet
    auction.end_time = Utc::now() - Duration::seconds(1);
    ledger.insert_auction(auction);

    let err = handle_place_bid(bid(1, 5000), BIDDER_ONE, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::AuctionEnded));
}

#[tokio::test]
async fn bids_before_the_window_opens_are_rejected() {
    let ledger = InMemoryLedger::new();
    let mut auction = open_auction(1);
    auction.start_time = Utc::now() + Duration::hours(1);
    auction.status = status::SCHEDULED.to_string();
    ledger.insert_auction(auction);

    let err = handle_place_bid(bid(1, 5000), BIDDER_ONE, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::AuctionNotStarted));
}

#[tokio::test]
async fn buy_now_completes_the_auction_and_blocks_further_bids() {
    let ledger = InMemoryLedger::new();
    let mut auction = open_auction(1);
    auction.buy_now_price = Some(10_000);
    ledger.insert_auction(auction);

    handle_buy_now(BuyNowCommand { auction_id: 1 }, BIDDER_ONE, &ledger)
        .await
        .unwrap();

    let auction = ledger.auction(1).unwrap();
    assert_eq!(auction.current_bid, Some(10_000));
    assert_eq!(auction.highest_bidder_id, Some(BIDDER_ONE));
    assert_eq!(auction.status, status::COMPLETED);

    let err = handle_place_bid(bid(1, 30_000), BIDDER_TWO, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::AuctionEnded));
}

#[tokio::test]
async fn buy_now_requires_a_buy_now_price() {
    let ledger = InMemoryLedger::new();
    ledger.insert_auction(open_auction(1));

    let err = handle_buy_now(BuyNowCommand { auction_id: 1 }, BIDDER_ONE, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::NoBuyNowPrice));
}

#[tokio::test]
async fn seller_cannot_buy_own_auction() {
    let ledger = InMemoryLedger::new();
    let mut auction = open_auction(1);
    auction.buy_now_price = Some(10_000);
    ledger.insert_auction(auction);

    let err = handle_buy_now(BuyNowCommand { auction_id: 1 }, SELLER, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::SelfPurchase));
}

/// The full walkthrough: first bid at starting price, a short bid rejected
/// with the computed minimum, a clean outbid, then buy-now ends it all.
#[tokio::test]
async fn auction_walkthrough() {
    let ledger = InMemoryLedger::new();
    ledger.insert_auction(open_auction(1));

    handle_place_bid(bid(1, 5000), BIDDER_ONE, &ledger)
        .await
        .unwrap();

    let err = handle_place_bid(bid(1, 5300), BIDDER_TWO, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::BidTooLow { minimum: 5500 }));

    handle_place_bid(bid(1, 5500), BIDDER_TWO, &ledger)
        .await
        .unwrap();

    // the seller opens a buy-now exit
    let mut auction = ledger.auction(1).unwrap();
    auction.buy_now_price = Some(20_000);
    ledger.insert_auction(auction);

    handle_buy_now(BuyNowCommand { auction_id: 1 }, BIDDER_ONE, &ledger)
        .await
        .unwrap();

    let auction = ledger.auction(1).unwrap();
    assert_eq!(auction.current_bid, Some(20_000));
    assert_eq!(auction.highest_bidder_id, Some(BIDDER_ONE));
    assert_eq!(auction.status, status::COMPLETED);

    let err = handle_place_bid(bid(1, 30_000), BIDDER_TWO, &ledger)
        .await
        .unwrap_err();
    assert!(matches!(err, MarketError::AuctionEnded));

    let amounts: Vec<i64> = ledger.bids_for(1).iter().map(|b| b.bid_amount).collect();
    assert_eq!(amounts, vec![5000, 5500, 20_000]);
}

/// Concurrent bidders racing on one auction: every accepted bid is in the
/// log, the log maximum equals the ledger, and the top amount always wins.
#[tokio::test]
async fn concurrent_bidding_loses_no_updates() {
    let ledger = Arc::new(InMemoryLedger::new());
    ledger.insert_auction(open_auction(1));

    let mut handles = vec![];
    for i in 0..20_i64 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            handle_place_bid(bid(1, 5000 + i * 500), 100 + i, ledger.as_ref()).await
        }));
    }

    let mut accepted = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => accepted += 1,
            Err(MarketError::BidTooLow { .. }) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }

    let auction = ledger.auction(1).unwrap();
    let log = ledger.bids_for(1);
    assert_eq!(log.len(), accepted);

    // the highest amount clears every possible minimum, so it always lands
    assert_eq!(auction.current_bid, Some(5000 + 19 * 500));
    let log_max = log.iter().map(|b| b.bid_amount).max().unwrap();
    assert_eq!(auction.current_bid, Some(log_max));
}
