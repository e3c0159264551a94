use axum::{http::StatusCode, response::IntoResponse};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    // 以下の 5 つは利用者の操作順序に起因する想定内の失敗なのでログには残さない
    #[error("{0}")]
    UnavailableForCheckout(String),
    #[error("{0}")]
    AlreadyCheckedOut(String),
    #[error("{0}")]
    NotCheckedOut(String),
    #[error("{0}")]
    ReservationNotAllowed(String),
    #[error("{0}")]
    DuplicateReservation(String),
    #[error("ドキュメントストアの処理実行中にエラーが発生しました: {0}")]
    DocumentStoreError(String),
    #[error("No rows affected: {0}")]
    NoRowAffectedError(String),
    #[error("{0}")]
    ConversionEntityError(String),
    #[error("{0}")]
    BcryptError(#[from] bcrypt::BcryptError),
    #[error("{0}")]
    ConvertToUuidError(#[from] uuid::Error),
    #[error("ログインに失敗しました")]
    UnauthenticatedError,
    #[error("認可情報が間違っています")]
    UnauthorizedError,
    #[error("許可されていない操作です")]
    ForbiddenOperation,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match self {
            AppError::UnprocessableEntity(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ValidationError(_) | AppError::ConvertToUuidError(_) => {
                StatusCode::BAD_REQUEST
            }
            // 貸出・返却・予約の前提条件を満たしていない場合は 409 で返し、
            // クライアントに最新の状態を取り直してもらう
            AppError::UnavailableForCheckout(_)
            | AppError::AlreadyCheckedOut(_)
            | AppError::NotCheckedOut(_)
            | AppError::ReservationNotAllowed(_)
            | AppError::DuplicateReservation(_) => StatusCode::CONFLICT,
            AppError::UnauthenticatedError | AppError::ForbiddenOperation => StatusCode::FORBIDDEN,
            AppError::UnauthorizedError => StatusCode::UNAUTHORIZED,
            e @ (AppError::DocumentStoreError(_)
            | AppError::NoRowAffectedError(_)
            | AppError::ConversionEntityError(_)
            | AppError::BcryptError(_)) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "Unexpected error happened"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        status_code.into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::AppError;

    #[test]
    fn circulation_failures_are_conflicts() {
        let errors = [
            AppError::UnavailableForCheckout("在庫なし".into()),
            AppError::AlreadyCheckedOut("貸出済み".into()),
            AppError::NotCheckedOut("未貸出".into()),
            AppError::ReservationNotAllowed("在庫あり".into()),
            AppError::DuplicateReservation("予約済み".into()),
        ];
        for e in errors {
            assert_eq!(e.into_response().status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn missing_entity_is_not_found() {
        let res = AppError::EntityNotFound("蔵書が見つかりません".into()).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn storage_failures_are_internal_errors() {
        let errors = [
            AppError::DocumentStoreError("boom".into()),
            AppError::NoRowAffectedError("stale version".into()),
            AppError::ConversionEntityError("unknown field".into()),
        ];
        for e in errors {
            assert_eq!(
                e.into_response().status(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[test]
    fn auth_failures_map_to_auth_statuses() {
        assert_eq!(
            AppError::UnauthenticatedError.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::UnauthorizedError.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::ForbiddenOperation.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
