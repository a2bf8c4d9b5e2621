//! Validates contract fixtures against frozen JSON schemas and checks that the
//! client-side interpretation agrees with them.

use hiresong_generation_contract::{
    GeneratedVideo, GenerationContractError, RawResponse, interpret_response,
};
use jsonschema::JSONSchema;
use serde_json::Value;

const CONTRACTS: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../contracts");

fn read_contract(name: &str) -> Vec<u8> {
    std::fs::read(format!("{CONTRACTS}/{name}")).expect("contract file should be readable")
}

fn load_json(name: &str) -> Value {
    serde_json::from_slice(&read_contract(name)).expect("contract file should be valid json")
}

fn compile_validator(schema: &str) -> JSONSchema {
    JSONSchema::compile(&load_json(schema)).expect("schema should compile")
}

fn json_response(status: u16, fixture: &str) -> RawResponse {
    RawResponse {
        status,
        content_type: Some("application/json".to_string()),
        body: read_contract(fixture),
    }
}

#[test]
fn success_fixture_matches_schema_and_yields_remote_video() {
    let validator = compile_validator("generate-success.schema.json");
    assert!(
        validator.is_valid(&load_json("fixtures/generate-success.valid.json")),
        "success fixture should validate against schema"
    );

    let video = interpret_response(json_response(200, "fixtures/generate-success.valid.json"))
        .expect("valid success body should be accepted");
    assert_eq!(
        video,
        GeneratedVideo::Remote {
            url: "https://cdn.hiresong.dev/videos/3f2a9c.mp4".to_string()
        }
    );
}

#[test]
fn success_without_url_is_rejected_by_schema_and_client() {
    let validator = compile_validator("generate-success.schema.json");
    assert!(!validator.is_valid(&load_json("fixtures/generate-success.missing-url.json")));

    let error = interpret_response(json_response(200, "fixtures/generate-success.missing-url.json"))
        .expect_err("body without video_url must fail");
    assert!(matches!(error, GenerationContractError::MissingVideoUrl));
    assert_eq!(error.to_string(), "No video URL in response");
}

#[test]
fn error_fixture_matches_schema_and_surfaces_detail() {
    let validator = compile_validator("generate-error.schema.json");
    assert!(validator.is_valid(&load_json("fixtures/generate-error.valid.json")));

    let error = interpret_response(json_response(500, "fixtures/generate-error.valid.json"))
        .expect_err("non-2xx must fail");
    assert_eq!(error.to_string(), "Could not extract text from the uploaded CV");
}
