use axum::Json;
use axum::http::StatusCode;
use serde::Serialize;

/// The uniform success envelope: `{ statusCode, message, data }`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub message: String,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(status: StatusCode, message: &str, data: T) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self {
                status_code: status.as_u16(),
                message: message.to_string(),
                data,
            }),
        )
    }
}

/// 1-based pagination block shared by every listing endpoint.
pub fn paginate(total: i64, page: u64, limit: u64) -> raah_types::api::Pagination {
    let total = total.max(0) as u64;
    let limit = limit.max(1);
    raah_types::api::Pagination {
        total,
        page,
        limit,
        pages: total.div_ceil(limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_shape_is_camel_case() {
        let (status, body) = ApiResponse::success(StatusCode::CREATED, "Created", 42);
        assert_eq!(status, StatusCode::CREATED);
        let json = serde_json::to_value(&body.0).unwrap();
        assert_eq!(json["statusCode"], 201);
        assert_eq!(json["message"], "Created");
        assert_eq!(json["data"], 42);
    }

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(paginate(25, 2, 10).pages, 3);
        assert_eq!(paginate(30, 1, 10).pages, 3);
        assert_eq!(paginate(0, 1, 10).pages, 0);
        assert_eq!(paginate(1, 1, 50).pages, 1);
    }
}
