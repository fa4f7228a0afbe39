//! API integration tests against a running server

use std::io::Cursor;

use reqwest::{multipart, Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

const BASE_URL: &str = "http://localhost:8080";

fn url(path: &str) -> String {
    format!("{}{}", BASE_URL, path)
}

/// Valid ISBN-13 that no other test run has used
fn unique_isbn() -> String {
    let seed = Uuid::new_v4().as_u128();
    let mut digits: Vec<u32> = vec![9, 7, 8];
    digits.extend((0..9).map(|i| ((seed >> (i * 4)) % 10) as u32));
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, d)| if i % 2 == 0 { *d } else { d * 3 })
        .sum();
    digits.push((10 - sum % 10) % 10);
    digits.iter().map(|d| d.to_string()).collect()
}

/// Register a fresh user and return (email, token)
async fn register_and_login(client: &Client) -> (String, String) {
    let email = format!("user-{}@test.com", Uuid::new_v4());
    let response = client
        .post(url("/api/user/create/"))
        .json(&json!({
            "email": email,
            "name": "TestName",
            "password": "testpass123"
        }))
        .send()
        .await
        .expect("Failed to send registration request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = client
        .post(url("/api/user/token/"))
        .json(&json!({"email": email, "password": "testpass123"}))
        .send()
        .await
        .expect("Failed to send token request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse token response");
    let token = body["token"].as_str().expect("No token in response").to_string();
    (email, token)
}

async fn create(client: &Client, token: &str, path: &str, body: Value) -> Value {
    let response = client
        .post(url(path))
        .header("Authorization", format!("Token {}", token))
        .json(&body)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED, "POST {path}");
    response.json().await.expect("Failed to parse response")
}

async fn list(client: &Client, token: &str, path: &str) -> Vec<Value> {
    let response = client
        .get(url(path))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK, "GET {path}");
    response.json().await.expect("Failed to parse response")
}

fn ids(items: &[Value]) -> Vec<Value> {
    items.iter().map(|item| item["id"].clone()).collect()
}

/// Author, publishing house and a book of theirs; returns (author, house, book)
async fn create_book(client: &Client, token: &str, genre: &[&Value]) -> (Value, Value, Value) {
    let author = create(
        client,
        token,
        "/api/book/author/",
        json!({"first_name": "Jan", "last_name": format!("Kowalski {}", Uuid::new_v4())}),
    )
    .await;
    let house = create(
        client,
        token,
        "/api/book/publihouse/",
        json!({"name": format!("Znak {}", Uuid::new_v4())}),
    )
    .await;
    let book = create(
        client,
        token,
        "/api/book/book/",
        json!({
            "name": "Pan Tadeusz",
            "author": author["id"],
            "publishing_house": house["id"],
            "number_of_pages": 340,
            "isbn": unique_isbn(),
            "year_of_publish": "1834-06-28",
            "genre": genre.iter().map(|g| g["id"].clone()).collect::<Vec<_>>()
        }),
    )
    .await;
    (author, house, book)
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image::DynamicImage::new_rgb8(4, 4)
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    bytes.into_inner()
}

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_health_check() {
    let client = Client::new();

    let response = client
        .get(url("/health"))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
#[ignore]
async fn test_registration_returns_public_profile() {
    let client = Client::new();
    let email = format!("user-{}@TEST.com", Uuid::new_v4());

    let response = client
        .post(url("/api/user/create/"))
        .json(&json!({"email": email, "name": "TestName", "password": "isvaliduser"}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "TestName");
    assert!(body["email"].as_str().unwrap().ends_with("@test.com"));
    assert!(body.get("password").is_none());

    // Same address again
    let response = client
        .post(url("/api/user/create/"))
        .json(&json!({"email": email, "name": "Other", "password": "isvaliduser"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_token_is_stable_and_bad_credentials_fail() {
    let client = Client::new();
    let (email, token) = register_and_login(&client).await;
    assert!(!token.is_empty());

    let again: Value = client
        .post(url("/api/user/token/"))
        .json(&json!({"email": email, "password": "testpass123"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(again["token"], token.as_str());

    for body in [
        json!({"email": email, "password": "wrongpass"}),
        json!({"email": "nobody@test.com", "password": "testpass123"}),
        json!({"email": email, "password": ""}),
    ] {
        let response = client.post(url("/api/user/token/")).json(&body).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert!(body.get("token").is_none());
    }
}

#[tokio::test]
#[ignore]
async fn test_profile_requires_token_and_updates() {
    let client = Client::new();

    let response = client.get(url("/api/user/me/")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (email, token) = register_and_login(&client).await;

    let body: Value = client
        .get(url("/api/user/me/"))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body, json!({"name": "TestName", "email": email}));

    let response = client
        .patch(url("/api/user/me/"))
        .header("Authorization", format!("Bearer {}", token))
        .json(&json!({"name": "Renamed", "password": "newpassword"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Renamed");

    let response = client
        .post(url("/api/user/token/"))
        .json(&json!({"email": email, "password": "newpassword"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
#[ignore]
async fn test_attribute_creation_rejects_blank_names() {
    let client = Client::new();
    let (_, token) = register_and_login(&client).await;

    for (path, body) in [
        ("/api/book/genre/", json!({"name": ""})),
        ("/api/book/author/", json!({"first_name": "", "last_name": "Sapkowski"})),
        ("/api/book/publihouse/", json!({"name": "  "})),
    ] {
        let response = client
            .post(url(path))
            .header("Authorization", format!("Token {}", token))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "POST {path}");
    }
}

#[tokio::test]
#[ignore]
async fn test_book_detail_nests_relations() {
    let client = Client::new();
    let (_, token) = register_and_login(&client).await;

    let author = create(
        &client,
        &token,
        "/api/book/author/",
        json!({"first_name": "Andrzej", "last_name": "Sapkowski"}),
    )
    .await;
    let house = create(
        &client,
        &token,
        "/api/book/publihouse/",
        json!({"name": format!("Helion {}", Uuid::new_v4())}),
    )
    .await;
    let genre = create(&client, &token, "/api/book/genre/", json!({"name": "Fantasy"})).await;

    let book = create(
        &client,
        &token,
        "/api/book/book/",
        json!({
            "name": "Wiedzmin Tom I",
            "author": author["id"],
            "publishing_house": house["id"],
            "number_of_pages": 300,
            "isbn": unique_isbn(),
            "year_of_publish": "2000-11-11",
            "genre": [genre["id"]]
        }),
    )
    .await;
    assert_eq!(book["author"], author["id"]);

    let detail: Value = client
        .get(url(&format!("/api/book/book/{}/", book["id"])))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(detail["author"]["last_name"], "Sapkowski");
    assert_eq!(detail["publishing_house"]["id"], house["id"]);
    assert_eq!(detail["genre"][0]["name"], "Fantasy");
}

#[tokio::test]
#[ignore]
async fn test_book_isbn_validation_and_genre_filter() {
    let client = Client::new();
    let (_, token) = register_and_login(&client).await;

    let author = create(
        &client,
        &token,
        "/api/book/author/",
        json!({"first_name": "Stanislaw", "last_name": "Lem"}),
    )
    .await;
    let house = create(
        &client,
        &token,
        "/api/book/publihouse/",
        json!({"name": format!("Czytelnik {}", Uuid::new_v4())}),
    )
    .await;
    let scifi = create(&client, &token, "/api/book/genre/", json!({"name": "Sci-Fi"})).await;
    let essay = create(&client, &token, "/api/book/genre/", json!({"name": "Essay"})).await;

    let book_body = |isbn: String, genre: &Value| {
        json!({
            "name": "Solaris",
            "author": author["id"],
            "publishing_house": house["id"],
            "number_of_pages": 200,
            "isbn": isbn,
            "year_of_publish": "1961-01-01",
            "genre": [genre["id"]]
        })
    };

    let response = client
        .post(url("/api/book/book/"))
        .header("Authorization", format!("Token {}", token))
        .json(&book_body("123".to_string(), &scifi))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["fields"]["isbn"].is_array());

    let solaris = create(&client, &token, "/api/book/book/", book_body(unique_isbn(), &scifi)).await;
    let dialogues = create(&client, &token, "/api/book/book/", book_body(unique_isbn(), &essay)).await;

    let filtered: Vec<Value> = client
        .get(url(&format!("/api/book/book/?genre={}", scifi["id"])))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(filtered.iter().any(|b| b["id"] == solaris["id"]));
    assert!(filtered.iter().all(|b| b["id"] != dialogues["id"]));

    let both: Vec<Value> = client
        .get(url(&format!("/api/book/book/?genre={},{}", scifi["id"], essay["id"])))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(both.iter().any(|b| b["id"] == solaris["id"]));
    assert!(both.iter().any(|b| b["id"] == dialogues["id"]));

    let assigned: Vec<Value> = client
        .get(url("/api/book/genre/?assigned_only=1"))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(assigned.iter().any(|g| g["id"] == scifi["id"]));
}

#[tokio::test]
#[ignore]
async fn test_copy_lifecycle_and_upload() {
    let client = Client::new();
    let (_, token) = register_and_login(&client).await;

    let author = create(
        &client,
        &token,
        "/api/book/author/",
        json!({"first_name": "Olga", "last_name": "Tokarczuk"}),
    )
    .await;
    let house = create(
        &client,
        &token,
        "/api/book/publihouse/",
        json!({"name": format!("Wydawnictwo Literackie {}", Uuid::new_v4())}),
    )
    .await;
    let book = create(
        &client,
        &token,
        "/api/book/book/",
        json!({
            "name": "Bieguni",
            "author": author["id"],
            "publishing_house": house["id"],
            "number_of_pages": 450,
            "isbn": unique_isbn(),
            "year_of_publish": "2007-10-01"
        }),
    )
    .await;
    assert_eq!(book["genre"], json!([]));

    let copy = create(&client, &token, "/api/book/bookinstance/", json!({"book": book["id"]})).await;
    assert_eq!(copy["status"], "a");
    assert_eq!(copy["user"], json!([]));

    let copy_url = url(&format!("/api/book/bookinstance/{}/", copy["id"].as_str().unwrap()));
    let response = client
        .patch(&copy_url)
        .header("Authorization", format!("Token {}", token))
        .json(&json!({"status": "o"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["status"], "o");

    let form = multipart::Form::new().part(
        "cover",
        multipart::Part::bytes(b"notimage".to_vec()).file_name("cover.jpg"),
    );
    let response = client
        .post(url(&format!("/api/book/book/{}/upload-image/", book["id"])))
        .header("Authorization", format!("Token {}", token))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .delete(url(&format!("/api/book/book/{}/", book["id"])))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Copies go with their book
    let response = client
        .get(&copy_url)
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore]
async fn test_isbn_spellings_are_one_book() {
    let client = Client::new();
    let (_, token) = register_and_login(&client).await;
    let (author, house, _) = create_book(&client, &token, &[]).await;

    let book_body = |isbn: String| {
        json!({
            "name": "Lalka",
            "author": author["id"],
            "publishing_house": house["id"],
            "number_of_pages": 700,
            "isbn": isbn,
            "year_of_publish": "1890-01-01"
        })
    };
    let post = |body: Value| {
        client
            .post(url("/api/book/book/"))
            .header("Authorization", format!("Token {}", token))
            .json(&body)
            .send()
    };

    // 978-83-7578-063-5 style grouping
    let bare = unique_isbn();
    let hyphenated = format!(
        "{}-{}-{}-{}-{}",
        &bare[..3],
        &bare[3..5],
        &bare[5..9],
        &bare[9..12],
        &bare[12..]
    );
    let book = create(&client, &token, "/api/book/book/", book_body(hyphenated)).await;
    assert_eq!(book["isbn"], bare.as_str());

    let response = post(book_body(bare.clone())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["fields"]["isbn"][0], "book with this isbn already exists.");

    // Odd separators fit the column once reduced to digits
    let other = unique_isbn();
    let doubled = format!("{}--{}", &other[..3], &other[3..]);
    let book = create(&client, &token, "/api/book/book/", book_body(doubled)).await;
    assert_eq!(book["isbn"], other.as_str());

    let spaced: String = other.chars().map(|c| format!("{c} ")).collect();
    let response = post(book_body(spaced)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore]
async fn test_book_filters_combine_with_and() {
    let client = Client::new();
    let (_, token) = register_and_login(&client).await;

    let drama = create(&client, &token, "/api/book/genre/", json!({"name": "Drama"})).await;
    let poetry = create(&client, &token, "/api/book/genre/", json!({"name": "Poetry"})).await;

    let (author, _, matching) = create_book(&client, &token, &[&drama]).await;
    let (_, _, other_author) = create_book(&client, &token, &[&drama]).await;
    let other_genre = create(
        &client,
        &token,
        "/api/book/book/",
        json!({
            "name": "Sonety krymskie",
            "author": author["id"],
            "publishing_house": matching["publishing_house"],
            "number_of_pages": 60,
            "isbn": unique_isbn(),
            "year_of_publish": "1826-01-01",
            "genre": [poetry["id"]]
        }),
    )
    .await;

    let found = ids(&list(
        &client,
        &token,
        &format!("/api/book/book/?genre={}&author={}", drama["id"], author["id"]),
    )
    .await);
    assert_eq!(found, vec![matching["id"].clone()]);
    assert!(!found.contains(&other_author["id"]));
    assert!(!found.contains(&other_genre["id"]));
}

#[tokio::test]
#[ignore]
async fn test_copy_filters() {
    let client = Client::new();
    let (_, token) = register_and_login(&client).await;

    let (first_author, first_house, first_book) = create_book(&client, &token, &[]).await;
    let (second_author, second_house, second_book) = create_book(&client, &token, &[]).await;

    let lent = create(&client, &token, "/api/book/bookinstance/", json!({"book": first_book["id"]})).await;
    let shelved =
        create(&client, &token, "/api/book/bookinstance/", json!({"book": second_book["id"]})).await;

    // Profiles carry no id: offer a range of ids and keep one that was not refused
    let candidates: Vec<i32> = (1..=500).collect();
    let lent_url = url(&format!("/api/book/bookinstance/{}/", lent["id"].as_str().unwrap()));
    let response = client
        .patch(&lent_url)
        .header("Authorization", format!("Token {}", token))
        .json(&json!({"user": candidates}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let refused: Value = response.json().await.unwrap();
    let refused: Vec<String> = refused["fields"]["user"]
        .as_array()
        .unwrap()
        .iter()
        .map(|message| message.as_str().unwrap().to_string())
        .collect();
    let borrower = candidates
        .iter()
        .find(|id| !refused.iter().any(|m| m.contains(&format!("\"{}\"", id))))
        .copied()
        .expect("no user id below 500");

    let response = client
        .patch(&lent_url)
        .header("Authorization", format!("Token {}", token))
        .json(&json!({"user": [borrower], "status": "o"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let by_user = ids(&list(&client, &token, &format!("/api/book/bookinstance/?user={borrower}")).await);
    assert!(by_user.contains(&lent["id"]));
    assert!(!by_user.contains(&shelved["id"]));

    let by_author = ids(&list(
        &client,
        &token,
        &format!("/api/book/bookinstance/?author={}", first_author["id"]),
    )
    .await);
    assert_eq!(by_author, vec![lent["id"].clone()]);

    let by_house = ids(&list(
        &client,
        &token,
        &format!("/api/book/bookinstance/?publishing_house={}", second_house["id"]),
    )
    .await);
    assert_eq!(by_house, vec![shelved["id"].clone()]);

    let either = ids(&list(
        &client,
        &token,
        &format!(
            "/api/book/bookinstance/?author={},{}&publishing_house={}",
            first_author["id"], second_author["id"], first_house["id"]
        ),
    )
    .await);
    assert_eq!(either, vec![lent["id"].clone()]);
}

#[tokio::test]
#[ignore]
async fn test_cover_upload_is_served() {
    let client = Client::new();
    let (_, token) = register_and_login(&client).await;
    let (_, _, book) = create_book(&client, &token, &[]).await;
    let copy = create(&client, &token, "/api/book/bookinstance/", json!({"book": book["id"]})).await;

    for (path, id) in [
        (format!("/api/book/book/{}/upload-image/", book["id"]), book["id"].clone()),
        (
            format!("/api/book/bookinstance/{}/upload-image/", copy["id"].as_str().unwrap()),
            copy["id"].clone(),
        ),
    ] {
        let form = multipart::Form::new().part(
            "cover",
            multipart::Part::bytes(png_bytes())
                .file_name("cover.png")
                .mime_str("image/png")
                .unwrap(),
        );
        let response = client
            .post(url(&path))
            .header("Authorization", format!("Token {}", token))
            .multipart(form)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK, "POST {path}");

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["id"], id);
        let cover = body["cover"].as_str().expect("No cover in response");
        assert!(cover.starts_with("/media/uploads/"));
        assert!(cover.ends_with(".png"));

        let served = client.get(url(cover)).send().await.unwrap();
        assert_eq!(served.status(), StatusCode::OK);
        assert_eq!(served.bytes().await.unwrap().to_vec(), png_bytes());
    }
}

#[tokio::test]
#[ignore]
async fn test_rejected_writes_persist_nothing() {
    let client = Client::new();
    let email = format!("user-{}@test.com", Uuid::new_v4());

    let response = client
        .post(url("/api/user/create/"))
        .json(&json!({"email": email, "name": "TestName", "password": "12345"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(url("/api/user/token/"))
        .json(&json!({"email": email, "password": "12345"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body.get("token").is_none());

    // The address is still free
    let response = client
        .post(url("/api/user/create/"))
        .json(&json!({"email": email, "name": "TestName", "password": "123456"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let (_, token) = register_and_login(&client).await;
    let marker = Uuid::new_v4().to_string();
    let response = client
        .post(url("/api/book/author/"))
        .header("Authorization", format!("Token {}", token))
        .json(&json!({"first_name": "  ", "last_name": marker}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let authors = list(&client, &token, "/api/book/author/").await;
    assert!(authors.iter().all(|a| a["last_name"] != marker.as_str()));
}

#[tokio::test]
#[ignore]
async fn test_unknown_copy_is_404_before_field_errors() {
    let client = Client::new();
    let (_, token) = register_and_login(&client).await;

    let response = client
        .patch(url(&format!("/api/book/bookinstance/{}/", Uuid::new_v4())))
        .header("Authorization", format!("Token {}", token))
        .json(&json!({"book": 0}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = client
        .get(url("/api/book/bookinstance/not-a-uuid/"))
        .header("Authorization", format!("Token {}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"], "NotFound");
}
