// HTTP route detection across common web frameworks
//
// Runs against raw content independently of the chosen extractor and
// augments its symbols. Pattern-based like everything else here: a route
// is a decorator, builder call, or annotation idiom we recognize.

use once_cell::sync::Lazy;
use regex::Regex;

use super::RawSymbol;
use crate::store::SymbolKind;

struct RoutePattern {
    regex: Regex,
    framework: &'static str,
    /// Capture index for the HTTP method, or a fixed method.
    method: MethodSource,
    path_group: usize,
    handler_group: Option<usize>,
}

enum MethodSource {
    Group(usize),
    /// Flask-style `methods=[...]` keyword, defaulting to GET.
    FlaskKeyword,
}

static ROUTE_PATTERNS: Lazy<Vec<RoutePattern>> = Lazy::new(|| {
    vec![
        // Express / Koa / Fastify builder style:
        //   app.get('/users', handler) / router.post("/x", async (req, res) => ...)
        RoutePattern {
            regex: Regex::new(
                r#"(?m)\b(?:app|router|server|api)\.(get|post|put|delete|patch|head|options|all)\s*\(\s*['"`]([^'"`]+)['"`]\s*,\s*(?:async\s+)?(?:function\s+)?([A-Za-z_$][\w$]*)?"#,
            )
            .unwrap(),
            framework: "express",
            method: MethodSource::Group(1),
            path_group: 2,
            handler_group: Some(3),
        },
        // Flask: @app.route('/users', methods=['POST'])
        RoutePattern {
            regex: Regex::new(
                r#"(?m)^[\t ]*@(?:\w+)\.route\s*\(\s*['"]([^'"]+)['"](?:.*methods\s*=\s*\[['"](\w+)['"])?"#,
            )
            .unwrap(),
            framework: "flask",
            method: MethodSource::FlaskKeyword,
            path_group: 1,
            handler_group: None,
        },
        // FastAPI: @app.get("/users") / @router.post("/items")
        RoutePattern {
            regex: Regex::new(
                r#"(?m)^[\t ]*@(?:\w+)\.(get|post|put|delete|patch|head|options)\s*\(\s*['"]([^'"]+)['"]"#,
            )
            .unwrap(),
            framework: "fastapi",
            method: MethodSource::Group(1),
            path_group: 2,
            handler_group: None,
        },
        // Spring: @GetMapping("/users"), @RequestMapping(value = "/x")
        RoutePattern {
            regex: Regex::new(
                r#"@(Get|Post|Put|Delete|Patch|Request)Mapping\s*\(\s*(?:value\s*=\s*)?['"]([^'"]+)['"]"#,
            )
            .unwrap(),
            framework: "spring",
            method: MethodSource::Group(1),
            path_group: 2,
            handler_group: None,
        },
        // NestJS: @Get('users'), @Post()
        RoutePattern {
            regex: Regex::new(
                r#"(?m)^[\t ]*@(Get|Post|Put|Delete|Patch|Head|Options)\s*\(\s*['"]?([^'")]*)['"]?\s*\)"#,
            )
            .unwrap(),
            framework: "nestjs",
            method: MethodSource::Group(1),
            path_group: 2,
            handler_group: None,
        },
        // Gin: r.GET("/users", listUsers)
        RoutePattern {
            regex: Regex::new(
                r#"\b\w+\.(GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS)\s*\(\s*"([^"]+)"\s*,\s*([\w.]+)?"#,
            )
            .unwrap(),
            framework: "gin",
            method: MethodSource::Group(1),
            path_group: 2,
            handler_group: Some(3),
        },
        // Axum: .route("/users", get(list_users))
        RoutePattern {
            regex: Regex::new(
                r#"\.route\s*\(\s*"([^"]+)"\s*,\s*(get|post|put|delete|patch)\s*\(\s*([A-Za-z_]\w*)?"#,
            )
            .unwrap(),
            framework: "axum",
            method: MethodSource::Group(2),
            path_group: 1,
            handler_group: Some(3),
        },
        // Rails: get '/users', to: 'users#index'
        RoutePattern {
            regex: Regex::new(
                r#"(?m)^[\t ]*(get|post|put|delete|patch)\s+['"]([^'"]+)['"]\s*(?:,\s*to:\s*['"]([\w#]+)['"])?"#,
            )
            .unwrap(),
            framework: "rails",
            method: MethodSource::Group(1),
            path_group: 2,
            handler_group: Some(3),
        },
    ]
});

/// Detect route declarations; `language` narrows nothing today but keeps
/// the signature stable for per-language tables later.
pub fn detect(content: &str, _language: Option<&str>) -> Vec<RawSymbol> {
    let mut endpoints: Vec<RawSymbol> = Vec::new();

    for pattern in ROUTE_PATTERNS.iter() {
        for caps in pattern.regex.captures_iter(content) {
            let Some(path_match) = caps.get(pattern.path_group) else {
                continue;
            };
            let path = path_match.as_str().trim();

            let method = match pattern.method {
                MethodSource::Group(idx) => caps
                    .get(idx)
                    .map(|m| m.as_str().to_ascii_uppercase())
                    .unwrap_or_else(|| "GET".to_string()),
                MethodSource::FlaskKeyword => caps
                    .get(2)
                    .map(|m| m.as_str().to_ascii_uppercase())
                    .unwrap_or_else(|| "GET".to_string()),
            };
            // Spring's catch-all maps to GET-ish semantics
            let method = if method == "REQUEST" { "ANY".to_string() } else { method };

            let handler = pattern
                .handler_group
                .and_then(|idx| caps.get(idx))
                .map(|m| m.as_str().to_string())
                .filter(|h| !h.is_empty());

            let offset = caps.get(0).map(|m| m.start()).unwrap_or(0);
            let line = content[..offset].matches('\n').count() as u32 + 1;

            let name = handler
                .clone()
                .unwrap_or_else(|| format!("{method} {path}"));

            // De-duplicate by (line, name) across frameworks
            if endpoints
                .iter()
                .any(|e| e.line_start == line && e.name == name)
            {
                continue;
            }

            endpoints.push(RawSymbol {
                name,
                kind: SymbolKind::Endpoint,
                line_start: line,
                line_end: line,
                signature: None,
                metadata: serde_json::json!({
                    "framework": pattern.framework,
                    "method": method,
                    "path": path,
                    "handler": handler,
                    "exported": true,
                }),
            });
        }
    }

    endpoints
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_express_routes() {
        let src = r#"
app.get('/users', function listUsers(req, res) {});
router.post('/users', createUser);
"#;
        let found = detect(src, Some("javascript"));
        assert_eq!(found.len(), 2);

        assert_eq!(found[0].name, "listUsers");
        assert_eq!(found[0].metadata["method"], "GET");
        assert_eq!(found[0].metadata["path"], "/users");
        assert_eq!(found[0].metadata["framework"], "express");

        assert_eq!(found[1].name, "createUser");
        assert_eq!(found[1].metadata["method"], "POST");
    }

    #[test]
    fn test_flask_and_fastapi_decorators() {
        let src = r#"
@app.route('/items', methods=['POST'])
def create_item():
    pass

@router.get("/items/{id}")
async def read_item(id):
    pass
"#;
        let found = detect(src, Some("python"));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].metadata["method"], "POST");
        assert_eq!(found[0].metadata["framework"], "flask");
        assert_eq!(found[1].metadata["method"], "GET");
        assert_eq!(found[1].metadata["framework"], "fastapi");
    }

    #[test]
    fn test_spring_annotation() {
        let src = r#"
    @GetMapping("/accounts")
    public List<Account> listAccounts() { return repo.findAll(); }
"#;
        let found = detect(src, Some("java"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].metadata["method"], "GET");
        assert_eq!(found[0].metadata["path"], "/accounts");
    }

    #[test]
    fn test_gin_and_axum() {
        let gin = detect(r#"r.GET("/ping", pingHandler)"#, Some("go"));
        assert_eq!(gin.len(), 1);
        assert_eq!(gin[0].name, "pingHandler");

        let axum = detect(
            r#"let app = Router::new().route("/health", get(health_check));"#,
            Some("rust"),
        );
        assert_eq!(axum.len(), 1);
        assert_eq!(axum[0].name, "health_check");
        assert_eq!(axum[0].metadata["method"], "GET");
    }

    #[test]
    fn test_dedup_by_line_and_name() {
        // Express pattern and Rails pattern could both fire on one line;
        // only one endpoint survives per (line, name).
        let src = "app.get('/x', handler)\napp.get('/x', handler)\n";
        let found = detect(src, Some("javascript"));
        assert_eq!(found.len(), 2); // different lines, same name: both kept
        assert_ne!(found[0].line_start, found[1].line_start);
    }

    #[test]
    fn test_no_routes_in_plain_code() {
        let found = detect("function add(a, b) { return a + b; }\n", Some("javascript"));
        assert!(found.is_empty());
    }
}
