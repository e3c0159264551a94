use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use shared::error::{AppError, AppResult};

use crate::model::{
    book::{event::UpdateAvailability, Book, BookStatus},
    checkout::{event::CreateCheckout, Checkout},
    id::{BookId, UserId},
    reservation::{event::CreateReservation, Reservation},
};
use crate::repository::{
    book::BookRepository, checkout::CheckoutRepository, reservation::ReservationRepository,
};

// 条件付き書き込みが competing writer に負けたときの再試行回数。
// 前提条件の検証からやり直すので 1 回で十分
const CONFLICT_RETRIES: usize = 1;

// 蔵書 ID ごとの排他区間。「検証してから更新する」一連の流れを蔵書単位で直列化する。
// 蔵書は削除されないため、エントリ数は蔵書数で頭打ちになる
#[derive(Default)]
struct BookLocks {
    inner: tokio::sync::Mutex<HashMap<BookId, Arc<tokio::sync::Mutex<()>>>>,
}

impl BookLocks {
    async fn for_book(&self, book_id: BookId) -> Arc<tokio::sync::Mutex<()>> {
        let mut map = self.inner.lock().await;
        Arc::clone(map.entry(book_id).or_default())
    }
}

/// 貸出・返却・予約のドメインサービス。
///
/// 蔵書ドキュメント・貸出台帳・予約キューの 3 ストアをまたぐ更新は
/// すべてここを経由する。同一蔵書への操作はロックで直列化したうえで、
/// 蔵書側の条件付き書き込み (version 比較) を直列化点として扱い、
/// 競合に負けた場合は前提条件の検証からやり直す。
pub struct CirculationService {
    books: Arc<dyn BookRepository>,
    checkouts: Arc<dyn CheckoutRepository>,
    reservations: Arc<dyn ReservationRepository>,
    locks: BookLocks,
}

impl CirculationService {
    pub fn new(
        books: Arc<dyn BookRepository>,
        checkouts: Arc<dyn CheckoutRepository>,
        reservations: Arc<dyn ReservationRepository>,
    ) -> Self {
        Self {
            books,
            checkouts,
            reservations,
            locks: BookLocks::default(),
        }
    }

    /// 貸出。在庫が 1 冊以上あり、利用者が同じ蔵書を借りていないときだけ成功する
    pub async fn checkout_book(&self, book_id: BookId, user_id: UserId) -> AppResult<()> {
        let lock = self.locks.for_book(book_id).await;
        let _guard = lock.lock().await;

        self.with_conflict_retry(|| self.try_checkout(book_id, user_id))
            .await
    }

    /// 返却。予約が入っていれば在庫には戻さず、最古の予約者への貸出に振り替える
    pub async fn return_book(&self, book_id: BookId, user_id: UserId) -> AppResult<()> {
        let lock = self.locks.for_book(book_id).await;
        let _guard = lock.lock().await;

        self.with_conflict_retry(|| self.try_return(book_id, user_id))
            .await
    }

    /// 予約。在庫切れの蔵書に対してのみ、1 利用者あたり 1 件まで受け付ける
    pub async fn reserve_book(&self, book_id: BookId, user_id: UserId) -> AppResult<()> {
        let lock = self.locks.for_book(book_id).await;
        let _guard = lock.lock().await;

        self.with_conflict_retry(|| self.try_reserve(book_id, user_id))
            .await
    }

    // NoRowAffectedError は「読み取ってから書き込むまでの間に誰かが蔵書を
    // 更新した」ことを意味する。在庫数が変わった可能性があるため、
    // 結果を引き継がずに前提条件の検証からやり直す
    async fn with_conflict_retry<F, Fut>(&self, mut attempt: F) -> AppResult<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<()>>,
    {
        let mut attempts = 0;
        loop {
            match attempt().await {
                Err(AppError::NoRowAffectedError(message)) if attempts < CONFLICT_RETRIES => {
                    attempts += 1;
                    tracing::warn!(%message, "conditional write lost a race, revalidating");
                }
                other => return other,
            }
        }
    }

    async fn try_checkout(&self, book_id: BookId, user_id: UserId) -> AppResult<()> {
        let book = self.load_book(book_id).await?;

        if book.available_copies == 0 {
            return Err(AppError::UnavailableForCheckout(
                "貸出可能な在庫がありません".into(),
            ));
        }
        if self
            .checkouts
            .find_active(book_id, user_id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyCheckedOut(
                "この蔵書はすでに借りています".into(),
            ));
        }

        // 在庫があった以上、予約キューは空 (予約は在庫ゼロでしか作られない)
        let available = book.available_copies - 1;
        self.books
            .set_available_and_status(UpdateAvailability {
                book_id,
                expected_version: book.version,
                available_copies: available,
                status: BookStatus::derive(available, 0),
            })
            .await?;

        if let Err(e) = self
            .checkouts
            .create(CreateCheckout { book_id, user_id })
            .await
        {
            self.restore_availability(&book).await;
            return Err(e);
        }
        Ok(())
    }

    async fn try_return(&self, book_id: BookId, user_id: UserId) -> AppResult<()> {
        let book = self.load_book(book_id).await?;

        let Some(checkout) = self.checkouts.find_active(book_id, user_id).await? else {
            return Err(AppError::NotCheckedOut(
                "この蔵書は借りていないため返却できません".into(),
            ));
        };

        match self.reservations.peek_oldest(book_id).await? {
            Some(next) => self.transfer_to_reserver(&book, &checkout, &next).await,
            None => self.release_copy(&book, &checkout).await,
        }
    }

    async fn try_reserve(&self, book_id: BookId, user_id: UserId) -> AppResult<()> {
        let book = self.load_book(book_id).await?;

        if book.available_copies > 0 {
            return Err(AppError::ReservationNotAllowed(
                "在庫のある蔵書は予約できません。そのまま借りてください".into(),
            ));
        }
        if self
            .checkouts
            .find_active(book_id, user_id)
            .await?
            .is_some()
        {
            return Err(AppError::AlreadyCheckedOut(
                "すでにこの蔵書を借りているため予約できません".into(),
            ));
        }
        if self
            .reservations
            .find_by_book_and_user(book_id, user_id)
            .await?
            .is_some()
        {
            return Err(AppError::DuplicateReservation(
                "この蔵書はすでに予約しています".into(),
            ));
        }

        let reservation = self
            .reservations
            .enqueue(CreateReservation { book_id, user_id })
            .await?;

        // キューに 1 件以上入ったので状態は Reserved (冪等な上書き)。
        // version 比較により、検証中に他の書き込みが挟まった場合はここで検出される
        let update = UpdateAvailability {
            book_id,
            expected_version: book.version,
            available_copies: book.available_copies,
            status: BookStatus::Reserved,
        };
        if let Err(e) = self.books.set_available_and_status(update).await {
            if let Err(undo) = self.reservations.dequeue(reservation.id).await {
                tracing::error!(
                    error.cause_chain = ?undo,
                    book_id = %book_id,
                    reservation_id = %reservation.id,
                    "failed to remove reservation after status update failure"
                );
            }
            return Err(e);
        }
        Ok(())
    }

    // 予約が無い返却。1 冊を在庫に戻してから台帳のレコードを消す
    async fn release_copy(&self, book: &Book, checkout: &Checkout) -> AppResult<()> {
        let available = book.available_copies + 1;
        self.books
            .set_available_and_status(UpdateAvailability {
                book_id: book.id,
                expected_version: book.version,
                available_copies: available,
                status: BookStatus::derive(available, 0),
            })
            .await?;

        if let Err(e) = self.checkouts.delete(checkout.id).await {
            self.restore_availability(book).await;
            return Err(e);
        }
        Ok(())
    }

    // FIFO 移譲。返却された 1 冊は在庫に戻らず、最古の予約者の貸出になる。
    // 在庫数は変わらず、状態ラベルだけが残りのキュー長に合わせて変わる
    async fn transfer_to_reserver(
        &self,
        book: &Book,
        checkout: &Checkout,
        reservation: &Reservation,
    ) -> AppResult<()> {
        let remaining = self.reservations.count_for_book(book.id).await? - 1;
        self.books
            .set_available_and_status(UpdateAvailability {
                book_id: book.id,
                expected_version: book.version,
                available_copies: book.available_copies,
                status: BookStatus::derive(book.available_copies, remaining),
            })
            .await?;

        let transferred = match self
            .checkouts
            .create(CreateCheckout {
                book_id: book.id,
                user_id: reservation.user_id,
            })
            .await
        {
            Ok(c) => c,
            Err(e) => {
                self.restore_availability(book).await;
                return Err(e);
            }
        };

        if let Err(e) = self.reservations.dequeue(reservation.id).await {
            if let Err(undo) = self.checkouts.delete(transferred.id).await {
                tracing::error!(
                    error.cause_chain = ?undo,
                    book_id = %book.id,
                    checkout_id = %transferred.id,
                    "failed to undo transferred checkout"
                );
            }
            self.restore_availability(book).await;
            return Err(e);
        }

        if let Err(e) = self.checkouts.delete(checkout.id).await {
            // 返却者のレコードを消せなかったので、ここまでの 3 書き込みを
            // 逆順に巻き戻す。作り直した予約は列の最後尾に入る
            if let Err(undo) = self
                .reservations
                .enqueue(CreateReservation {
                    book_id: book.id,
                    user_id: reservation.user_id,
                })
                .await
            {
                tracing::error!(
                    error.cause_chain = ?undo,
                    book_id = %book.id,
                    user_id = %reservation.user_id,
                    "failed to restore reservation after ledger delete failure"
                );
            }
            if let Err(undo) = self.checkouts.delete(transferred.id).await {
                tracing::error!(
                    error.cause_chain = ?undo,
                    book_id = %book.id,
                    checkout_id = %transferred.id,
                    "failed to undo transferred checkout"
                );
            }
            self.restore_availability(book).await;
            return Err(e);
        }
        Ok(())
    }

    // 後続の書き込みに失敗したときの補償。蔵書を読み取り時点の内容に戻す。
    // 直前の条件付き更新で version は 1 進んでいるので、その値を期待して戻す。
    // 補償まで失敗した場合は台帳と在庫数がずれるため、ログに残して調査につなげる
    async fn restore_availability(&self, book: &Book) {
        let restore = UpdateAvailability {
            book_id: book.id,
            expected_version: book.version + 1,
            available_copies: book.available_copies,
            status: book.status,
        };
        if let Err(e) = self.books.set_available_and_status(restore).await {
            tracing::error!(
                error.cause_chain = ?e,
                book_id = %book.id,
                "failed to restore availability, book record may be inconsistent"
            );
        }
    }

    async fn load_book(&self, book_id: BookId) -> AppResult<Book> {
        self.books
            .find_by_id(book_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound("指定された蔵書が見つかりません".into()))
    }
}
