use std::sync::Mutex;

use actix_web::{delete, get, post, put, web, App, HttpResponse, HttpServer, Responder};

use log::{info, warn};
use serde::Deserialize;
use rs_bleu_core::BleuError;
use rs_bleu_core::metric::config::{BleuConfig, Smoothing};
use rs_bleu_core::metric::stats::{bleu_stats, BleuStats};
use rs_bleu_core::metric::DEFAULT_MAX_ORDER;

/// Body of the `/v1/sentence_bleu` and `/v1/stats` endpoints.
///
/// Tokens are already split; the server never tokenizes text.
#[derive(Deserialize)]
struct SentenceParams {
	hypothesis: Vec<String>,
	reference: Vec<String>,
	max_order: Option<usize>,
	smoothed: Option<bool>,
}

/// Body of the `/v1/corpus_bleu` endpoint.
#[derive(Deserialize)]
struct CorpusParams {
	candidates: Vec<Vec<String>>,
	references: Vec<Vec<Vec<String>>>,
	max_order: Option<usize>,
}

#[derive(Deserialize)]
struct ScoreQuery {
	smoothed: Option<bool>,
}

/// Running statistics accumulated across `/v1/stats` calls.
struct SharedData {
	stats: BleuStats,
}

impl SentenceParams {
	/// Builds the scoring configuration from optional parameters.
	fn config(&self) -> Result<BleuConfig, BleuError> {
		let smoothing = if self.smoothed.unwrap_or(false) { Smoothing::AddOne } else { Smoothing::None };
		Ok(BleuConfig::new(self.max_order.unwrap_or(DEFAULT_MAX_ORDER))?.with_smoothing(smoothing))
	}
}

fn bad_request(e: BleuError) -> HttpResponse {
	warn!("rejected request: {e}");
	HttpResponse::BadRequest().body(e.to_string())
}

/// HTTP POST endpoint `/v1/sentence_bleu`
///
/// Scores one hypothesis against one reference.
/// Returns the score as the response body.
#[post("/v1/sentence_bleu")]
async fn post_sentence_bleu(params: web::Json<SentenceParams>) -> impl Responder {
	let score = params
		.config()
		.and_then(|config| config.sentence_score(&params.hypothesis, &params.reference));

	match score {
		Ok(score) => HttpResponse::Ok().body(score.to_string()),
		Err(e) => bad_request(e),
	}
}

/// HTTP POST endpoint `/v1/corpus_bleu`
///
/// Scores a whole corpus at once. Returns the score as the response body.
#[post("/v1/corpus_bleu")]
async fn post_corpus_bleu(params: web::Json<CorpusParams>) -> impl Responder {
	let score = BleuConfig::new(params.max_order.unwrap_or(DEFAULT_MAX_ORDER))
		.and_then(|config| config.corpus_score(&params.candidates, &params.references));

	match score {
		Ok(score) => HttpResponse::Ok().body(score.to_string()),
		Err(e) => bad_request(e),
	}
}

/// HTTP POST endpoint `/v1/stats`
///
/// Adds the statistics of one pair to the running accumulator and
/// returns the accumulated flat layout.
#[post("/v1/stats")]
async fn post_stats(data: web::Data<Mutex<SharedData>>, params: web::Json<SentenceParams>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Stats lock failed"),
	};

	let max_order = params.max_order.unwrap_or(shared_data.stats.max_order());
	let pair = match bleu_stats(&params.hypothesis, &params.reference, max_order) {
		Ok(pair) => pair,
		Err(e) => return bad_request(e),
	};
	if let Err(e) = shared_data.stats.merge(&pair) {
		return bad_request(e);
	}

	info!("accumulated pair: {:?}", pair.to_vec());
	HttpResponse::Ok().json(shared_data.stats.to_vec())
}

#[get("/v1/stats")]
async fn get_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Stats lock failed"),
	};
	HttpResponse::Ok().json(shared_data.stats.to_vec())
}

/// HTTP GET endpoint `/v1/stats/score`
///
/// Scores the accumulated statistics once, plain or smoothed.
#[get("/v1/stats/score")]
async fn get_stats_score(data: web::Data<Mutex<SharedData>>, query: web::Query<ScoreQuery>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Stats lock failed"),
	};

	let score = if query.smoothed.unwrap_or(false) {
		shared_data.stats.smoothed_bleu()
	} else {
		shared_data.stats.bleu()
	};
	HttpResponse::Ok().body(score.to_string())
}

#[delete("/v1/stats")]
async fn delete_stats(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Stats lock failed"),
	};

	let max_order = shared_data.stats.max_order();
	match BleuStats::empty(max_order) {
		Ok(stats) => shared_data.stats = stats,
		Err(e) => return bad_request(e),
	}
	info!("statistics reset");
	HttpResponse::Ok().body("Statistics reset")
}

/// HTTP GET endpoint `/v1/stats/snapshot`
///
/// Returns the accumulated statistics as a `postcard` snapshot.
#[get("/v1/stats/snapshot")]
async fn get_snapshot(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Stats lock failed"),
	};

	match shared_data.stats.to_bytes() {
		Ok(bytes) => HttpResponse::Ok().content_type("application/octet-stream").body(bytes),
		Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
	}
}

/// HTTP PUT endpoint `/v1/stats/snapshot`
///
/// Merges a `postcard` snapshot produced by another worker into the
/// running statistics.
#[put("/v1/stats/snapshot")]
async fn put_snapshot(data: web::Data<Mutex<SharedData>>, body: web::Bytes) -> impl Responder {
	let partial = match BleuStats::from_bytes(&body) {
		Ok(stats) => stats,
		Err(e) => return bad_request(e),
	};

	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Stats lock failed"),
	};
	match shared_data.stats.merge(&partial) {
		Ok(_) => HttpResponse::Ok().json(shared_data.stats.to_vec()),
		Err(e) => bad_request(e),
	}
}

/// Registers every endpoint on the application.
fn configure(cfg: &mut web::ServiceConfig) {
	cfg.service(post_sentence_bleu)
		.service(post_corpus_bleu)
		.service(post_stats)
		.service(get_stats)
		.service(get_stats_score)
		.service(delete_stats)
		.service(get_snapshot)
		.service(put_snapshot);
}

/// Reads the listening port from `RS_BLEU_PORT`, defaulting to 5000.
fn port() -> u16 {
	match std::env::var("RS_BLEU_PORT") {
		Ok(value) => value.parse().unwrap_or_else(|_| {
			warn!("invalid RS_BLEU_PORT {value:?}, using 5000");
			5000
		}),
		Err(_) => 5000,
	}
}

/// Main entry point for the server.
///
/// Creates an empty BLEU-4 accumulator, wraps it in a `Mutex` and starts
/// an Actix-web HTTP server on 127.0.0.1.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let stats = BleuStats::empty(DEFAULT_MAX_ORDER)
		.map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
	let shared_data = web::Data::new(Mutex::new(SharedData { stats }));

	let port = port();
	info!("listening on 127.0.0.1:{port}");
	HttpServer::new(move || {
		App::new()
			.app_data(shared_data.clone())
			.configure(configure)
	})
		.bind(("127.0.0.1", port))?
		.run()
		.await
}

#[cfg(test)]
mod tests {
	use super::*;
	use actix_web::test;
	use serde_json::json;

	fn shared_data() -> web::Data<Mutex<SharedData>> {
		let stats = BleuStats::empty(DEFAULT_MAX_ORDER).unwrap();
		web::Data::new(Mutex::new(SharedData { stats }))
	}

	#[actix_web::test]
	async fn test_sentence_bleu() {
		let app = test::init_service(App::new().app_data(shared_data()).configure(configure)).await;
		let req = test::TestRequest::post()
			.uri("/v1/sentence_bleu")
			.set_json(json!({
				"hypothesis": ["a", "b", "c", "d"],
				"reference": ["a", "b", "c", "d"],
			}))
			.to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, "1");
	}

	#[actix_web::test]
	async fn test_sentence_bleu_smoothed() {
		let app = test::init_service(App::new().app_data(shared_data()).configure(configure)).await;
		let req = test::TestRequest::post()
			.uri("/v1/sentence_bleu")
			.set_json(json!({
				"hypothesis": ["a", "b"],
				"reference": ["c", "d"],
				"max_order": 1,
				"smoothed": true,
			}))
			.to_request();
		let body = test::call_and_read_body(&app, req).await;
		let score: f64 = std::str::from_utf8(&body).unwrap().parse().unwrap();
		assert!((score - 1.0 / 3.0).abs() < 1e-12);
	}

	#[actix_web::test]
	async fn test_invalid_order() {
		let app = test::init_service(App::new().app_data(shared_data()).configure(configure)).await;
		let req = test::TestRequest::post()
			.uri("/v1/sentence_bleu")
			.set_json(json!({ "hypothesis": ["a"], "reference": ["a"], "max_order": 0 }))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn test_corpus_bleu() {
		let app = test::init_service(App::new().app_data(shared_data()).configure(configure)).await;
		let req = test::TestRequest::post()
			.uri("/v1/corpus_bleu")
			.set_json(json!({
				"candidates": [["a", "b"], ["a", "b", "c", "d"]],
				"references": [[["a", "c"]], [["a", "b", "c", "d"]]],
				"max_order": 1,
			}))
			.to_request();
		let body = test::call_and_read_body(&app, req).await;
		let score: f64 = std::str::from_utf8(&body).unwrap().parse().unwrap();
		assert!((score - 5.0 / 6.0).abs() < 1e-12);
	}

	#[actix_web::test]
	async fn test_corpus_length_mismatch() {
		let app = test::init_service(App::new().app_data(shared_data()).configure(configure)).await;
		let req = test::TestRequest::post()
			.uri("/v1/corpus_bleu")
			.set_json(json!({ "candidates": [["a"]], "references": [] }))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn test_accumulate_and_score() {
		let data = shared_data();
		let app = test::init_service(App::new().app_data(data.clone()).configure(configure)).await;

		for (hyp, reference) in [(json!(["a", "b", "c", "d"]), json!(["a", "b", "c", "d"])), (json!(["x", "y"]), json!(["x", "z"]))] {
			let req = test::TestRequest::post()
				.uri("/v1/stats")
				.set_json(json!({ "hypothesis": hyp, "reference": reference }))
				.to_request();
			let resp = test::call_service(&app, req).await;
			assert!(resp.status().is_success());
		}

		let req = test::TestRequest::get().uri("/v1/stats").to_request();
		let stats: Vec<usize> = test::call_and_read_body_json(&app, req).await;
		assert_eq!(stats, vec![6, 6, 5, 6, 3, 4, 2, 2, 1, 1]);

		let req = test::TestRequest::get().uri("/v1/stats/score").to_request();
		let body = test::call_and_read_body(&app, req).await;
		let score: f64 = std::str::from_utf8(&body).unwrap().parse().unwrap();
		let expected = ((5.0f64 / 6.0) * 0.75).powf(0.25);
		assert!((score - expected).abs() < 1e-12);

		let req = test::TestRequest::delete().uri("/v1/stats").to_request();
		assert!(test::call_service(&app, req).await.status().is_success());
		assert_eq!(data.lock().unwrap().stats.to_vec(), vec![0; 10]);
	}

	#[actix_web::test]
	async fn test_accumulate_order_mismatch() {
		let app = test::init_service(App::new().app_data(shared_data()).configure(configure)).await;
		let req = test::TestRequest::post()
			.uri("/v1/stats")
			.set_json(json!({ "hypothesis": ["a"], "reference": ["a"], "max_order": 2 }))
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn test_snapshot_merge() {
		let data = shared_data();
		let app = test::init_service(App::new().app_data(data.clone()).configure(configure)).await;

		let partial = bleu_stats(&["a", "b"], &["a", "b"], DEFAULT_MAX_ORDER).unwrap();
		let req = test::TestRequest::put()
			.uri("/v1/stats/snapshot")
			.set_payload(partial.to_bytes().unwrap())
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert!(resp.status().is_success());

		let req = test::TestRequest::get().uri("/v1/stats/snapshot").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(BleuStats::from_bytes(&body).unwrap(), partial);

		let req = test::TestRequest::put()
			.uri("/v1/stats/snapshot")
			.set_payload(vec![0xffu8])
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
	}

	#[actix_web::test]
	async fn test_snapshot_overflow_keeps_stats_usable() {
		let data = shared_data();
		let app = test::init_service(App::new().app_data(data.clone()).configure(configure)).await;

		let req = test::TestRequest::post()
			.uri("/v1/stats")
			.set_json(json!({ "hypothesis": ["a", "b"], "reference": ["a", "b"] }))
			.to_request();
		assert!(test::call_service(&app, req).await.status().is_success());

		let forged = BleuStats::from_slice(&[usize::MAX, 1, 1, 1, 0, 0, 0, 0, 0, 0]).unwrap();
		let req = test::TestRequest::put()
			.uri("/v1/stats/snapshot")
			.set_payload(forged.to_bytes().unwrap())
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

		let req = test::TestRequest::get().uri("/v1/stats").to_request();
		let stats: Vec<usize> = test::call_and_read_body_json(&app, req).await;
		assert_eq!(stats, vec![2, 2, 2, 2, 1, 1, 0, 0, 0, 0]);
		assert!(!data.is_poisoned());
	}

	#[actix_web::test]
	async fn test_snapshot_matched_above_total() {
		let data = shared_data();
		let app = test::init_service(App::new().app_data(data.clone()).configure(configure)).await;

		// hypothesis_len 4, reference_len 4, 4 orders, first order 40 matches for 4 n-grams
		let forged = vec![4u8, 4, 4, 40, 4, 0, 0, 0, 0, 0, 0];
		let req = test::TestRequest::put()
			.uri("/v1/stats/snapshot")
			.set_payload(forged)
			.to_request();
		let resp = test::call_service(&app, req).await;
		assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);

		let req = test::TestRequest::get().uri("/v1/stats/score").to_request();
		let body = test::call_and_read_body(&app, req).await;
		assert_eq!(body, "0");
		assert_eq!(data.lock().unwrap().stats.to_vec(), vec![0; 10]);
	}
}
