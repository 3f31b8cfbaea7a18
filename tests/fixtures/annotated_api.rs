//! @openapi
//! info:
//!   title: Pet Store
//!   version: 1.0.0
//!   description: Served from ${FIXTURE_API_HOST}
//! tags:
//!   - name: pets

use axum::{extract::Path, routing::get, Json, Router};
use serde::Serialize;

/// A pet.
///
/// @openapi
/// components:
///   schemas:
///     Pet:
///       type: object
///       properties:
///         id:
///           type: integer
///         name:
///           type: string
#[derive(Serialize)]
pub struct Pet {
    id: u32,
    name: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/pets", get(list_pets))
        .route("/pets/:id", get(get_pet))
}

/// Lists all pets.
///
/// @openapi
/// paths:
///   /pets:
///     get:
///       tags: [pets]
///       summary: List pets
///       responses:
///         200:
///           description: OK
async fn list_pets() -> Json<Vec<Pet>> {
    Json(vec![])
}

/// @openapi
/// paths:
///   /pets/{id}:
///     get:
///       tags: [pets]
///       summary: Get a pet
///       parameters:
///         - name: id
///           in: path
///           required: true
///           schema:
///             type: integer
///       responses:
///         200:
///           description: OK
///         404:
///           description: Not found
async fn get_pet(Path(id): Path<u32>) -> Json<Pet> {
    Json(Pet {
        id,
        name: "Rex".to_string(),
    })
}
