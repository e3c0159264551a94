use std::sync::Arc;

use adapter::database::DocumentStore;
use adapter::repository::{
    book::BookRepositoryImpl, checkout::CheckoutRepositoryImpl,
    reservation::ReservationRepositoryImpl,
};
use kernel::model::{
    book::{event::CreateBook, Book, BookStatus},
    id::{BookId, UserId},
};
use kernel::repository::{
    book::BookRepository, checkout::CheckoutRepository, reservation::ReservationRepository,
};
use kernel::service::circulation::CirculationService;
use shared::error::AppError;

// 実ストア (インプロセス) の上でサービスを動かし、貸出・返却・予約の
// 一連の流れと整合性を確かめる
struct Harness {
    books: Arc<dyn BookRepository>,
    checkouts: Arc<dyn CheckoutRepository>,
    reservations: Arc<dyn ReservationRepository>,
    service: CirculationService,
}

fn harness() -> Harness {
    let db = DocumentStore::new();
    let books: Arc<dyn BookRepository> = Arc::new(BookRepositoryImpl::new(db.clone()));
    let checkouts: Arc<dyn CheckoutRepository> = Arc::new(CheckoutRepositoryImpl::new(db.clone()));
    let reservations: Arc<dyn ReservationRepository> =
        Arc::new(ReservationRepositoryImpl::new(db));
    let service = CirculationService::new(
        Arc::clone(&books),
        Arc::clone(&checkouts),
        Arc::clone(&reservations),
    );
    Harness {
        books,
        checkouts,
        reservations,
        service,
    }
}

impl Harness {
    async fn add_book(&self, copies: u32) -> Book {
        self.books
            .create(CreateBook {
                title: "三四郎".into(),
                author: "夏目漱石".into(),
                genre: "Fiction".into(),
                total_copies: copies,
            })
            .await
            .unwrap()
    }

    async fn book(&self, id: BookId) -> Book {
        self.books.find_by_id(id).await.unwrap().unwrap()
    }

    async fn holds(&self, book_id: BookId, user_id: UserId) -> bool {
        self.checkouts
            .find_active(book_id, user_id)
            .await
            .unwrap()
            .is_some()
    }

    // 在庫数・台帳・キューの間の不変条件を検算する
    async fn assert_consistent(&self, id: BookId) {
        let book = self.book(id).await;
        let active = self.checkouts.count_active_for_book(id).await.unwrap();
        let queued = self.reservations.count_for_book(id).await.unwrap();

        assert_eq!(
            book.available_copies as i64 + active,
            book.total_copies as i64,
            "available + active checkouts must equal total copies"
        );
        assert_eq!(
            book.status,
            BookStatus::derive(book.available_copies, queued),
            "stored status must match the derived one"
        );
        if queued > 0 {
            assert_eq!(book.available_copies, 0, "reservations require zero stock");
        }
    }
}

#[tokio::test]
async fn reserved_copy_skips_the_shelf_and_goes_to_the_reserver() {
    let h = harness();
    let book = h.add_book(1).await;
    let alice = UserId::new();
    let bob = UserId::new();

    h.service.checkout_book(book.id, alice).await.unwrap();
    assert_eq!(h.book(book.id).await.status, BookStatus::CheckedOut);

    h.service.reserve_book(book.id, bob).await.unwrap();
    assert_eq!(h.book(book.id).await.status, BookStatus::Reserved);

    // 返却された 1 冊は棚に戻らず bob の貸出になる
    h.service.return_book(book.id, alice).await.unwrap();
    let after = h.book(book.id).await;
    assert_eq!(after.available_copies, 0);
    assert_eq!(after.status, BookStatus::CheckedOut);
    assert!(h.holds(book.id, bob).await);
    assert!(!h.holds(book.id, alice).await);
    assert_eq!(h.reservations.count_for_book(book.id).await.unwrap(), 0);
    h.assert_consistent(book.id).await;

    // bob が返すと在庫に戻る
    h.service.return_book(book.id, bob).await.unwrap();
    let done = h.book(book.id).await;
    assert_eq!(done.available_copies, 1);
    assert_eq!(done.status, BookStatus::Available);
    h.assert_consistent(book.id).await;
}

#[tokio::test]
async fn reservations_are_served_strictly_first_come_first_served() {
    let h = harness();
    let book = h.add_book(1).await;
    let holder = UserId::new();
    let first = UserId::new();
    let second = UserId::new();
    let third = UserId::new();

    h.service.checkout_book(book.id, holder).await.unwrap();
    for user in [first, second, third] {
        h.service.reserve_book(book.id, user).await.unwrap();
    }

    h.service.return_book(book.id, holder).await.unwrap();
    assert!(h.holds(book.id, first).await);
    assert!(!h.holds(book.id, second).await);
    assert_eq!(h.book(book.id).await.status, BookStatus::Reserved);

    h.service.return_book(book.id, first).await.unwrap();
    assert!(h.holds(book.id, second).await);
    assert_eq!(h.book(book.id).await.status, BookStatus::Reserved);

    h.service.return_book(book.id, second).await.unwrap();
    assert!(h.holds(book.id, third).await);
    // 最後の 1 人に渡った時点でキューは空になる
    assert_eq!(h.book(book.id).await.status, BookStatus::CheckedOut);
    h.assert_consistent(book.id).await;
}

#[tokio::test]
async fn transfer_works_while_other_copies_remain_checked_out() {
    let h = harness();
    let book = h.add_book(2).await;
    let first_holder = UserId::new();
    let second_holder = UserId::new();
    let reserver = UserId::new();

    h.service.checkout_book(book.id, first_holder).await.unwrap();
    h.service
        .checkout_book(book.id, second_holder)
        .await
        .unwrap();
    h.service.reserve_book(book.id, reserver).await.unwrap();
    assert_eq!(h.book(book.id).await.status, BookStatus::Reserved);

    // 片方の返却で 1 冊が予約者に移る。もう片方の貸出はそのまま残る
    h.service.return_book(book.id, first_holder).await.unwrap();
    let after = h.book(book.id).await;
    assert_eq!(after.available_copies, 0);
    assert_eq!(after.status, BookStatus::CheckedOut);
    assert!(h.holds(book.id, reserver).await);
    assert!(h.holds(book.id, second_holder).await);
    assert!(!h.holds(book.id, first_holder).await);
    h.assert_consistent(book.id).await;
}

#[tokio::test]
async fn status_tracks_remaining_copies() {
    let h = harness();
    let book = h.add_book(2).await;
    let alice = UserId::new();
    let bob = UserId::new();

    h.service.checkout_book(book.id, alice).await.unwrap();
    let mid = h.book(book.id).await;
    assert_eq!(mid.available_copies, 1);
    assert_eq!(mid.status, BookStatus::Available);

    h.service.checkout_book(book.id, bob).await.unwrap();
    let empty = h.book(book.id).await;
    assert_eq!(empty.available_copies, 0);
    assert_eq!(empty.status, BookStatus::CheckedOut);

    h.service.return_book(book.id, alice).await.unwrap();
    let back = h.book(book.id).await;
    assert_eq!(back.available_copies, 1);
    assert_eq!(back.status, BookStatus::Available);
    h.assert_consistent(book.id).await;
}

#[tokio::test]
async fn checkout_preconditions_are_enforced() {
    let h = harness();
    let book = h.add_book(2).await;
    let alice = UserId::new();
    let bob = UserId::new();
    let carol = UserId::new();

    h.service.checkout_book(book.id, alice).await.unwrap();

    // 同じ蔵書の二重貸出。1 冊残っているので在庫切れではなくこちらで弾かれる
    let res = h.service.checkout_book(book.id, alice).await;
    assert!(matches!(res, Err(AppError::AlreadyCheckedOut(_))));

    // 在庫切れ
    h.service.checkout_book(book.id, bob).await.unwrap();
    let res = h.service.checkout_book(book.id, carol).await;
    assert!(matches!(res, Err(AppError::UnavailableForCheckout(_))));

    // 実在しない蔵書
    let res = h.service.checkout_book(BookId::new(), carol).await;
    assert!(matches!(res, Err(AppError::EntityNotFound(_))));

    h.assert_consistent(book.id).await;
}

#[tokio::test]
async fn double_borrow_of_the_last_copy_reads_as_out_of_stock() {
    let h = harness();
    let book = h.add_book(1).await;
    let alice = UserId::new();

    h.service.checkout_book(book.id, alice).await.unwrap();

    // 在庫の確認が二重貸出の確認より先。最後の 1 冊を借りている本人でも在庫切れになる
    let res = h.service.checkout_book(book.id, alice).await;
    assert!(matches!(res, Err(AppError::UnavailableForCheckout(_))));
    h.assert_consistent(book.id).await;
}

#[tokio::test]
async fn return_requires_an_active_checkout() {
    let h = harness();
    let book = h.add_book(1).await;

    let res = h.service.return_book(book.id, UserId::new()).await;
    assert!(matches!(res, Err(AppError::NotCheckedOut(_))));

    // 失敗した返却は何も書き換えない
    let untouched = h.book(book.id).await;
    assert_eq!(untouched.available_copies, 1);
    assert_eq!(untouched.version, 0);
}

#[tokio::test]
async fn reserve_preconditions_are_enforced() {
    let h = harness();
    let book = h.add_book(1).await;
    let holder = UserId::new();
    let waiting = UserId::new();

    // 在庫がある間は予約できない
    let res = h.service.reserve_book(book.id, waiting).await;
    assert!(matches!(res, Err(AppError::ReservationNotAllowed(_))));

    h.service.checkout_book(book.id, holder).await.unwrap();

    // 借りている本人は予約できない
    let res = h.service.reserve_book(book.id, holder).await;
    assert!(matches!(res, Err(AppError::AlreadyCheckedOut(_))));

    // 二重予約はできない
    h.service.reserve_book(book.id, waiting).await.unwrap();
    let res = h.service.reserve_book(book.id, waiting).await;
    assert!(matches!(res, Err(AppError::DuplicateReservation(_))));

    h.assert_consistent(book.id).await;
}

#[tokio::test]
async fn walk_in_borrower_cannot_jump_the_queue() {
    let h = harness();
    let book = h.add_book(1).await;
    let holder = UserId::new();
    let reserver = UserId::new();
    let walk_in = UserId::new();

    h.service.checkout_book(book.id, holder).await.unwrap();
    h.service.reserve_book(book.id, reserver).await.unwrap();

    // 在庫ゼロの間の貸出は在庫切れとして扱われる
    let res = h.service.checkout_book(book.id, walk_in).await;
    assert!(matches!(res, Err(AppError::UnavailableForCheckout(_))));

    h.service.return_book(book.id, holder).await.unwrap();

    // 返却後も 1 冊は予約者に渡っていて、飛び込みは借りられない
    let res = h.service.checkout_book(book.id, walk_in).await;
    assert!(matches!(res, Err(AppError::UnavailableForCheckout(_))));
    assert!(h.holds(book.id, reserver).await);
    h.assert_consistent(book.id).await;
}

#[tokio::test]
async fn concurrent_checkouts_grant_exactly_one_winner() {
    let h = harness();
    let book = h.add_book(1).await;
    let alice = UserId::new();
    let bob = UserId::new();

    let (a, b) = tokio::join!(
        h.service.checkout_book(book.id, alice),
        h.service.checkout_book(book.id, bob),
    );

    assert!(a.is_ok() != b.is_ok(), "exactly one of the two must win");
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(AppError::UnavailableForCheckout(_))));

    let after = h.book(book.id).await;
    assert_eq!(after.available_copies, 0);
    assert_eq!(h.checkouts.count_active_for_book(book.id).await.unwrap(), 1);
    h.assert_consistent(book.id).await;
}

#[tokio::test]
async fn concurrent_checkouts_never_oversell() {
    let h = harness();
    let book = h.add_book(2).await;
    let users: Vec<UserId> = (0..4).map(|_| UserId::new()).collect();

    h.service.checkout_book(book.id, users[0]).await.unwrap();
    h.service.checkout_book(book.id, users[1]).await.unwrap();

    // 返却 1 件と貸出 2 件が同じ蔵書に殺到する
    let (returned, c2, c3) = tokio::join!(
        h.service.return_book(book.id, users[0]),
        h.service.checkout_book(book.id, users[2]),
        h.service.checkout_book(book.id, users[3]),
    );
    returned.unwrap();

    // 空くのは 1 冊だけなので、勝者は多くても 1 人
    let winners = [c2.is_ok(), c3.is_ok()].iter().filter(|won| **won).count();
    assert!(winners <= 1);
    h.assert_consistent(book.id).await;
}

#[tokio::test]
async fn concurrent_return_and_reserve_agree_on_one_outcome() {
    let h = harness();
    let book = h.add_book(1).await;
    let holder = UserId::new();
    let reserver = UserId::new();

    h.service.checkout_book(book.id, holder).await.unwrap();

    let (returned, reserved) = tokio::join!(
        h.service.return_book(book.id, holder),
        h.service.reserve_book(book.id, reserver),
    );
    returned.unwrap();

    let after = h.book(book.id).await;
    match reserved {
        // 予約が先に並んだ。返却された 1 冊は予約者に移っている
        Ok(()) => {
            assert_eq!(after.available_copies, 0);
            assert!(h.holds(book.id, reserver).await);
        }
        // 返却が先に完了し、在庫ありの蔵書への予約として拒否された
        Err(AppError::ReservationNotAllowed(_)) => {
            assert_eq!(after.available_copies, 1);
            assert!(!h.holds(book.id, reserver).await);
        }
        Err(e) => panic!("unexpected error: {e}"),
    }
    h.assert_consistent(book.id).await;
}
