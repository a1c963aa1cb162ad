use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;
use std::{fs, io};

use chrono::Utc;
use ntex::web;
use ntex::web::HttpRequest;
use ntex_files::NamedFile;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use spdlog::{error, info, warn};

use crate::catalog::Catalog;
use crate::config::Config;
use crate::content::post_parser::PostError;
use crate::content::{Post, PostCard};
use crate::paginator::Paginator;
use crate::post_list::ContentStore;
use crate::query_string::QueryString;
use crate::search::search;
use crate::stats::dev::simulate_dev_stats;
use crate::stats::github::{github_stats, GithubClient};
use crate::stats::host::HostProbe;
use crate::stats::training::simulate_training;
use crate::view::list_renderer::ListRenderer;
use crate::view::post_renderer::{render_not_found, PostRenderer};

const NOT_FOUND_MESSAGE: &str = "Blog post not found";

pub struct AppState {
    config: Config,
    store: ContentStore,
    github: Option<GithubClient>,
    host: HostProbe,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let store = ContentStore::new(config.paths.content_dir.clone(), &config.content.extension);
        let github = config.github.as_ref().and_then(|settings| match GithubClient::new(settings) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("GitHub stats disabled: {}", e);
                None
            }
        });
        let host = HostProbe::new(&config.host);

        AppState {
            config,
            store,
            github,
            host,
        }
    }
}

type SharedState = web::types::State<Arc<AppState>>;

#[derive(Serialize)]
struct PostResponse<'a> {
    post: &'a Post,
}

#[derive(Serialize)]
struct SearchResponse {
    posts: Vec<PostCard>,
    total: usize,
}

fn query_string(req: &HttpRequest) -> QueryString {
    match req.uri().query() {
        Some(query_str) => QueryString::from(query_str),
        None => QueryString::default(),
    }
}

fn not_found_json() -> web::HttpResponse {
    web::HttpResponse::NotFound().json(&serde_json::json!({ "error": NOT_FOUND_MESSAGE }))
}

/// Posts that failed for another reason than being absent are logged and reported as absent.
fn log_unexpected(err: &PostError) {
    if !err.is_not_found() {
        error!("{}", err);
    }
}

#[web::get("/")]
async fn index() -> web::HttpResponse {
    web::HttpResponse::TemporaryRedirect()
        .header("Location", "/blog")
        .content_type("text/html; charset=utf-8")
        .finish()
}

#[web::get("/api/blog")]
async fn api_list_posts(req: HttpRequest, state: SharedState) -> web::HttpResponse {
    let qs = query_string(&req);
    let filter = qs.to_list_filter(state.config.content.list_limit_max);

    let catalog = Catalog::build(&state.store);
    web::HttpResponse::Ok().json(&catalog.list(&filter))
}

#[web::get("/api/blog/{slug}")]
async fn api_get_post(slug: web::types::Path<String>, state: SharedState) -> web::HttpResponse {
    let catalog = Catalog::build(&state.store);
    match catalog.get(&slug) {
        Ok(post) => web::HttpResponse::Ok().json(&PostResponse { post }),
        Err(e) => {
            log_unexpected(&e);
            not_found_json()
        }
    }
}

#[web::get("/api/search")]
async fn api_search(req: HttpRequest, state: SharedState) -> web::HttpResponse {
    let query = query_string(&req).to_search_query();
    let catalog = Catalog::build(&state.store);
    let cards: Vec<_> = catalog.posts().iter().map(Post::to_card).collect();

    let posts = search(&cards, &query);
    let total = posts.len();
    web::HttpResponse::Ok().json(&SearchResponse { posts, total })
}

#[web::get("/api/stats/blog")]
async fn api_blog_stats(state: SharedState) -> web::HttpResponse {
    let catalog = Catalog::build(&state.store);
    web::HttpResponse::Ok().json(&catalog.stats())
}

#[web::get("/api/stats/github")]
async fn api_github_stats(state: SharedState) -> web::HttpResponse {
    let stats = github_stats(state.github.as_ref(), Utc::now()).await;
    web::HttpResponse::Ok().json(&stats)
}

#[web::get("/api/stats/system")]
async fn api_system_stats(state: SharedState) -> web::HttpResponse {
    let mut rng = StdRng::from_entropy();
    let stats = state.host.collect(&mut rng, Utc::now()).await;
    web::HttpResponse::Ok().json(&stats)
}

#[web::get("/api/stats/dev")]
async fn api_dev_stats() -> web::HttpResponse {
    let mut rng = StdRng::from_entropy();
    web::HttpResponse::Ok().json(&simulate_dev_stats(&mut rng))
}

#[web::get("/api/stats/training")]
async fn api_training_stats() -> web::HttpResponse {
    let mut rng = StdRng::from_entropy();
    web::HttpResponse::Ok().json(&simulate_training(&mut rng, Utc::now()))
}

fn read_template(template_dir: &Path, name: &str) -> io::Result<String> {
    let template_path = template_dir.join(name);
    fs::read_to_string(&template_path).map_err(|e| {
        io::Error::new(e.kind(), format!("Error reading template {}: {}", template_path.display(), e))
    })
}

fn render_list(state: &AppState, qs: &QueryString) -> io::Result<String> {
    let catalog = Catalog::build(&state.store);
    let query = qs.to_search_query();
    let cards: Vec<_> = catalog.posts().iter().map(Post::to_card).collect();
    let found = search(&cards, &query);

    let paginator = Paginator::from(&found, state.config.content.page_size);
    let (cur_page, page) = paginator.page_or_first(qs.get_page());

    let template_src = read_template(&state.config.paths.template_dir, "postlist.tpl")?;
    let list_posts = ListRenderer::new(&template_src, paginator.page_count())?;

    Ok(list_posts.render(page, cur_page, &catalog.categories(), query.category.as_deref()))
}

#[web::get("/blog")]
async fn list(req: HttpRequest, state: SharedState) -> web::HttpResponse {
    let qs = query_string(&req);
    match render_list(&state, &qs) {
        Ok(rendered) => web::HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(rendered),
        Err(e) => {
            error!("Error listing posts: {}", e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error listing posts: {}", e))
        }
    }
}

fn render_post(state: &AppState, post: &Post) -> io::Result<String> {
    let template_src = read_template(&state.config.paths.template_dir, "post.tpl")?;
    let renderer = PostRenderer::new(&template_src)?;
    Ok(renderer.render(post))
}

#[web::get("/blog/{slug}")]
async fn view(slug: web::types::Path<String>, state: SharedState) -> web::HttpResponse {
    let slug = slug.into_inner();

    let post = match state.store.fetch_published(&slug) {
        Ok(post) => post,
        Err(e) => {
            log_unexpected(&e);
            let template_src = read_template(&state.config.paths.template_dir, "notfound.tpl").ok();
            return web::HttpResponse::NotFound()
                .content_type("text/html; charset=utf-8")
                .body(render_not_found(template_src.as_deref(), &slug));
        }
    };

    match render_post(&state, &post) {
        Ok(rendered) => web::HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(rendered),
        Err(e) => {
            error!("Error rendering post {}: {}", slug, e);
            web::HttpResponse::InternalServerError()
                .body(format!("Error loading post {}: {}", slug, e))
        }
    }
}

#[web::get("/public/{file_name}")]
async fn public_files(path: web::types::Path<String>, state: SharedState) -> Result<NamedFile, web::Error> {
    let file_name = path.into_inner();
    if file_name.contains("..") || file_name.contains('/') || file_name.contains('\\') {
        return Err(web::error::ErrorUnauthorized("Access forbidden").into());
    }

    let file_path = state.config.paths.public_dir.join(file_name);
    Ok(NamedFile::open(file_path)?)
}

pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.service(index)
        .service(api_list_posts)
        .service(api_search)
        .service(api_blog_stats)
        .service(api_github_stats)
        .service(api_system_stats)
        .service(api_dev_stats)
        .service(api_training_stats)
        .service(api_get_post)
        .service(list)
        .service(view)
        .service(public_files);
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let content_dir = &config.paths.content_dir;
    if !content_dir.is_dir() {
        warn!("Content directory {} does not exist. The blog will be empty", content_dir.display());
    }
    if !config.paths.template_dir.is_dir() {
        return Err(io::Error::new(
            ErrorKind::NotFound,
            format!("Template directory {} does not exist", config.paths.template_dir.display()),
        ));
    }

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let app_state = Arc::new(AppState::new(config));
    info!("Serving {} posts from {}", app_state.store.list_all_slugs().len(), app_state.store.root_dir.display());

    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .configure(app_config)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use ntex::http::StatusCode;
    use ntex::web::test;
    use tempfile::TempDir;

    use super::*;
    use crate::config::parse_config;
    use crate::test_data::{post_file, DRAFT_POST_MD, POST_DATA_MD};

    struct Site {
        _tmp: TempDir,
        state: Arc<AppState>,
    }

    fn site() -> Site {
        let tmp = TempDir::new().unwrap();
        let blog = tmp.path().join("blog");
        let templates = tmp.path().join("template");
        fs::create_dir(&blog).unwrap();
        fs::create_dir(&templates).unwrap();

        fs::write(blog.join("rag.md"), POST_DATA_MD).unwrap();
        fs::write(blog.join("draft.md"), DRAFT_POST_MD).unwrap();
        fs::write(blog.join("a.md"), post_file("a", "2025-01-01", Some("Rust"), false, true, 10)).unwrap();
        fs::write(blog.join("b.md"), post_file("b", "2024-01-01", Some("Rust"), true, true, 10)).unwrap();
        fs::write(blog.join("soon.md"), "---\ntitle: Soon\ndate: 2023-01-01\npublished: true\n---\n").unwrap();

        fs::write(templates.join("postlist.tpl"), "{{#post_list}}<{{link}}>{{/post_list}}{{#is_empty}}No posts yet{{/is_empty}}").unwrap();
        fs::write(templates.join("post.tpl"), "<h1>{{post_title}}</h1>{{#coming_soon}}Coming soon{{/coming_soon}}{{{post_content}}}").unwrap();
        fs::write(templates.join("notfound.tpl"), "Nothing at {{slug}}").unwrap();

        let config = parse_config(&format!(
            "[paths]\ncontent_dir = {:?}\ntemplate_dir = {:?}\npublic_dir = {:?}\n[content]\npage_size = 2\n[server]\naddress = \"127.0.0.1\"\nport = 0\n",
            blog, templates, tmp.path().join("public"),
        )).unwrap();

        Site { _tmp: tmp, state: Arc::new(AppState::new(config)) }
    }

    async fn get(site: &Site, uri: &str) -> (StatusCode, String) {
        let app = test::init_service(web::App::new().state(site.state.clone()).configure(app_config)).await;
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn get_json(site: &Site, uri: &str) -> (StatusCode, serde_json::Value) {
        let (status, body) = get(site, uri).await;
        (status, serde_json::from_str(&body).unwrap())
    }

    #[ntex::test]
    async fn test_api_list() {
        let site = site();
        let (status, json) = get_json(&site, "/api/blog?limit=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total"], 4);
        let slugs: Vec<&str> = json["posts"].as_array().unwrap().iter().map(|p| p["slug"].as_str().unwrap()).collect();
        assert_eq!(slugs, ["rag", "b"]);
        assert_eq!(json["categories"], serde_json::json!(["All", "Generative AI", "Rust"]));
        assert!(json["posts"][0].get("content").is_none());
    }

    #[ntex::test]
    async fn test_api_list_by_category() {
        let site = site();
        let (_, json) = get_json(&site, "/api/blog?category=Rust&limit=abc").await;
        assert_eq!(json["total"], 2);
        assert_eq!(json["posts"][0]["slug"], "a");
    }

    #[ntex::test]
    async fn test_api_get_post() {
        let site = site();
        let (status, json) = get_json(&site, "/api/blog/rag").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["post"]["title"], "Getting Started with RAG Systems");
        assert_eq!(json["post"]["readTime"], 12);

        for slug in ["draft", "missing-slug"] {
            let (status, json) = get_json(&site, &format!("/api/blog/{}", slug)).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(json["error"], NOT_FOUND_MESSAGE);
        }
    }

    #[ntex::test]
    async fn test_api_search() {
        let site = site();
        let (_, json) = get_json(&site, "/api/search?q=RAG&sort=title-asc").await;
        assert_eq!(json["total"], 1);
        assert_eq!(json["posts"][0]["slug"], "rag");

        let (_, json) = get_json(&site, "/api/search?sort=date-asc").await;
        let slugs: Vec<&str> = json["posts"].as_array().unwrap().iter().map(|p| p["slug"].as_str().unwrap()).collect();
        assert_eq!(slugs, ["b", "rag", "soon", "a"]);
    }

    #[ntex::test]
    async fn test_api_stats() {
        let site = site();
        let (_, json) = get_json(&site, "/api/stats/blog").await;
        assert_eq!(json["totalPosts"], 4);
        assert_eq!(json["pinnedCount"], 2);
        assert_eq!(json["latestDate"], "2025-01-01");

        let (status, json) = get_json(&site, "/api/stats/github").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totalCommits"], 1200);

        let (_, json) = get_json(&site, "/api/stats/dev").await;
        assert!(json.get("commitsToday").is_some());

        let (status, json) = get_json(&site, "/api/stats/training").await;
        assert_eq!(status, StatusCode::OK);
        assert!((70..=99).contains(&json["progress"].as_u64().unwrap()));
    }

    #[ntex::test]
    async fn test_html_pages() {
        let site = site();
        let (status, body) = get(&site, "/blog").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "</blog/rag></blog/b>");

        let (_, body) = get(&site, "/blog?page=2").await;
        assert_eq!(body, "</blog/a></blog/soon>");

        let (_, body) = get(&site, "/blog?page=7").await;
        assert_eq!(body, "</blog/rag></blog/b>");

        let (_, body) = get(&site, "/blog?category=Cooking").await;
        assert_eq!(body, "No posts yet");

        let (status, body) = get(&site, "/blog/soon").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "<h1>Soon</h1>Coming soon");

        let (status, body) = get(&site, "/blog/draft").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Nothing at draft");
    }
}
