//! Verify build/parse methods against JSON test vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs, the expected request, a simulated
//! response and the expected `Reply`. Parsed bodies are compared as values,
//! so field ordering in the simulated JSON does not matter.

use std::fmt::Debug;

use petfriends_core::{
    AuthKey, Credentials, HttpMethod, HttpRequest, HttpResponse, NewPet, Pet, PetFilter, PetFriendsClient,
    PetList, Reply,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

const BASE_URL: &str = "http://localhost:3000";

fn client() -> PetFriendsClient {
    PetFriendsClient::new(BASE_URL)
}

fn cases(raw: &str) -> Vec<Value> {
    let vectors: Value = serde_json::from_str(raw).unwrap();
    vectors["cases"].as_array().unwrap().clone()
}

fn parse_method(s: &str) -> HttpMethod {
    match s {
        "GET" => HttpMethod::Get,
        "POST" => HttpMethod::Post,
        "PUT" => HttpMethod::Put,
        "DELETE" => HttpMethod::Delete,
        other => panic!("unknown method: {other}"),
    }
}

fn pairs(value: &Value) -> Vec<(String, String)> {
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .map(|pair| {
                    let pair = pair.as_array().unwrap();
                    (pair[0].as_str().unwrap().to_string(), pair[1].as_str().unwrap().to_string())
                })
                .collect()
        })
        .unwrap_or_default()
}

fn auth_key(case: &Value) -> AuthKey {
    AuthKey::new(case["input"]["auth_key"].as_str().unwrap())
}

fn new_pet(case: &Value) -> NewPet {
    let input = &case["input"];
    NewPet::new(
        input["name"].as_str().unwrap(),
        input["animal_type"].as_str().unwrap(),
        input["age"].as_str().unwrap(),
    )
}

fn check_request(name: &str, req: &HttpRequest, expected: &Value) {
    assert_eq!(req.method, parse_method(expected["method"].as_str().unwrap()), "{name}: method");
    assert_eq!(req.path, format!("{BASE_URL}{}", expected["path"].as_str().unwrap()), "{name}: path");
    assert_eq!(req.query, pairs(&expected["query"]), "{name}: query");

    for (header, value) in pairs(&expected["headers"]) {
        assert_eq!(req.header(&header), Some(value.as_str()), "{name}: header {header}");
    }

    let fields = pairs(&expected["fields"]);
    if fields.is_empty() {
        assert!(req.body.is_none(), "{name}: body should be None");
    } else {
        let body = String::from_utf8_lossy(req.body.as_deref().unwrap()).into_owned();
        for (field, value) in fields {
            let part = format!("name=\"{field}\"\r\n\r\n{value}\r\n");
            assert!(body.contains(&part), "{name}: missing form field {field}");
        }
    }
}

fn simulated_response(case: &Value) -> HttpResponse {
    let sim = &case["simulated_response"];
    HttpResponse {
        status: sim["status"].as_u64().unwrap() as u16,
        headers: Vec::new(),
        body: sim["body"].as_str().unwrap().to_string(),
    }
}

fn check_reply<T>(name: &str, reply: &Reply<T>, case: &Value)
where
    T: DeserializeOwned + PartialEq + Debug,
{
    assert_eq!(
        u64::from(reply.status),
        case["expected_status"].as_u64().unwrap(),
        "{name}: status"
    );
    match case.get("expected_json") {
        Some(json) => {
            let expected: T = serde_json::from_value(json.clone()).unwrap();
            assert_eq!(reply.json(), Some(&expected), "{name}: parsed body");
        }
        None => {
            assert_eq!(reply.text(), case["expected_text"].as_str(), "{name}: raw body");
        }
    }
}

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

#[test]
fn api_key_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/api_key.json")) {
        let name = case["name"].as_str().unwrap();
        let credentials = Credentials::new(
            case["input"]["email"].as_str().unwrap(),
            case["input"]["password"].as_str().unwrap(),
        );

        let req = c.build_get_api_key(&credentials);
        check_request(name, &req, &case["expected_request"]);

        let reply = c.parse_get_api_key(simulated_response(&case));
        check_reply::<AuthKey>(name, &reply, &case);
    }
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

#[test]
fn list_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/list.json")) {
        let name = case["name"].as_str().unwrap();
        let filter = PetFilter::from(case["input"]["filter"].as_str().unwrap());

        let req = c.build_get_list_of_pets(&auth_key(&case), &filter);
        check_request(name, &req, &case["expected_request"]);

        let reply = c.parse_list_of_pets(simulated_response(&case));
        check_reply::<PetList>(name, &reply, &case);
    }
}

// ---------------------------------------------------------------------------
// Create without photo
// ---------------------------------------------------------------------------

#[test]
fn create_simple_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/create_simple.json")) {
        let name = case["name"].as_str().unwrap();

        let req = c.build_create_pet_simple(&auth_key(&case), &new_pet(&case));
        check_request(name, &req, &case["expected_request"]);

        let reply = c.parse_pet(simulated_response(&case));
        check_reply::<Pet>(name, &reply, &case);
    }
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[test]
fn update_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/update.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();

        let req = c.build_update_pet_info(&auth_key(&case), id, &new_pet(&case));
        check_request(name, &req, &case["expected_request"]);

        let reply = c.parse_pet(simulated_response(&case));
        check_reply::<Pet>(name, &reply, &case);
    }
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[test]
fn delete_test_vectors() {
    let c = client();
    for case in cases(include_str!("../../test-vectors/delete.json")) {
        let name = case["name"].as_str().unwrap();
        let id = case["input_id"].as_str().unwrap();

        let req = c.build_delete_pet(&auth_key(&case), id);
        check_request(name, &req, &case["expected_request"]);

        let reply = c.parse_delete_pet(simulated_response(&case));
        check_reply::<Value>(name, &reply, &case);
    }
}
