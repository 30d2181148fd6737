use std::sync::Mutex;

use actix_cors::Cors;
use actix_web::{get, put, web, App, HttpResponse, HttpServer, Responder};

use serde::Deserialize;
use trigen_core::io::list_files;
use trigen_core::model::trigram_model::{DEFAULT_MAX_LENGTH, TrigramModel};

/// Struct representing query parameters for the `/v1/generate` endpoint
#[derive(Deserialize)]
struct GenerateParams {
	max_length: Option<usize>,
	seed: Option<u64>, // fixed seed -> reproducible output
}

#[derive(Deserialize)]
struct ModelQuery {
	names: Option<String>
}

struct SharedData {
	model: TrigramModel
}

/// HTTP GET endpoint `/v1/generate`
///
/// Generates text from the loaded trigram model based on query parameters.
/// Returns the generated text as the response body.
#[get("/v1/generate")]
async fn get_generated(data: web::Data<Mutex<SharedData>>, query: web::Query<GenerateParams>) -> impl Responder {
	let max_length = query.max_length.unwrap_or(DEFAULT_MAX_LENGTH);

	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let result = match query.seed {
		Some(seed) => shared_data.model.generate_seeded(max_length, seed),
		None => shared_data.model.generate(max_length),
	};

	HttpResponse::Ok().body(result)
}

#[get("/v1/models")]
async fn get_models() -> impl Responder {
	match list_files(&"./data".to_owned(), "txt") {
		Ok(files) => HttpResponse::Ok().body(files.join("\n").replace(".txt", "")),
		Err(_) => HttpResponse::InternalServerError().body("Failed to list corpora")
	}
}

#[get("/v1/loaded_models")]
async fn get_loaded_models(data: web::Data<Mutex<SharedData>>) -> impl Responder {
	let shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};
	HttpResponse::Ok().body(shared_data.model.get_corpus_names().join("\n"))
}

#[put("/v1/load_models")]
async fn put_model(data: web::Data<Mutex<SharedData>>, query: web::Query<ModelQuery>) -> impl Responder {
	let mut shared_data = match data.lock() {
		Ok(m) => m,
		Err(_) => return HttpResponse::InternalServerError().body("Model lock failed"),
	};

	let query_names = match &query.names {
		Some(s) if !s.trim().is_empty() => s.trim(),
		_ => return HttpResponse::BadRequest().body("Missing or empty model name"),
	};

	let model_names: Vec<&str> = query_names
		.split(',')
		.map(|s| s.trim())
		.filter(|s| !s.is_empty())
		.collect();

	shared_data.model = TrigramModel::new();
	for name in model_names {
		let corpus_path = format!("./data/{}.txt", name);
		let partial_model = match TrigramModel::from_corpus_file(corpus_path) {
			Ok(m) => m,
			Err(e) => return HttpResponse::InternalServerError().body(format!("Failed to load model: {e}"))
		};
		shared_data.model.merge(&partial_model);
	}

	HttpResponse::Ok().body("Models loaded successfully")
}

/// Main entry point for the server.
///
/// Holds an initially empty trigram model behind a `Mutex`; corpora are
/// loaded and merged through the `/v1/load_models` endpoint.
///
/// # Notes
/// - The server binds to 127.0.0.1:5000.
/// - Currently, the corpus directory is hardcoded and should be made configurable.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
	env_logger::init();

	let shared_data = SharedData {
		model: TrigramModel::new(),
	};
	let shared_model = web::Data::new(Mutex::new(shared_data));

	log::info!("listening on 127.0.0.1:5000");

	HttpServer::new(move || {
		App::new()
			.wrap(Cors::permissive())
			.app_data(shared_model.clone())
			.service(get_generated)
			.service(get_models)
			.service(put_model)
			.service(get_loaded_models)
	})
		.bind(("127.0.0.1", 5000))?
		.run()
		.await
}
