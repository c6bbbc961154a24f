//! API design quality for web services: framework routes, OpenAPI
//! specifications and the security features around them.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use tracing::debug;

use super::dependencies::js_imports;
use super::{into_map, quality_label, AnalyzerOutput, RepoAnalyzer, RepoContext, SOURCE_EXTENSIONS};
use crate::errors::{Error, Result};

const SPEC_FILES: &[&str] = &[
    "swagger.json",
    "swagger.yaml",
    "swagger.yml",
    "openapi.json",
    "openapi.yaml",
    "openapi.yml",
];

const HTTP_METHODS: &[&str] = &["get", "post", "put", "patch", "delete", "head", "options"];

/// Python module → framework name
const PYTHON_FRAMEWORKS: &[(&str, &str)] = &[
    ("flask", "Flask"),
    ("fastapi", "FastAPI"),
    ("django", "Django"),
    ("rest_framework", "Django REST"),
    ("starlette", "Starlette"),
];

/// npm package → framework name
const SCRIPT_FRAMEWORKS: &[(&str, &str)] = &[
    ("express", "Express"),
    ("koa", "Koa"),
    ("@nestjs/core", "NestJS"),
    ("@nestjs/common", "NestJS"),
    ("fastify", "Fastify"),
];

static PY_FRAMEWORK_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^\s*(?:from|import)\s+(flask|fastapi|django|rest_framework|starlette)\b").unwrap()
});
static PY_ROUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@\w+\.(route|get|post|put|delete|patch)\(\s*['"]([^'"]*)['"]"#).unwrap()
});
static JS_ROUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(?:app|router|server|fastify|api)\.(get|post|put|delete|patch)\s*\(\s*['"`]([^'"`]*)['"`]"#).unwrap()
});
static NEST_ROUTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"@(Get|Post|Put|Delete|Patch)\(\s*(?:['"]([^'"]*)['"])?\s*\)"#).unwrap()
});
static DJANGO_ROUTE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\b(?:re_)?path\(\s*r?['"]([^'"]*)['"]"#).unwrap());

static AUTH_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bjwt\b|login_required|\bDepends\(|passport|authenticate|@UseGuards|bearer|oauth").unwrap()
});
static DOC_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bsummary\s*=|\bdescription\s*=|"""|/\*\*|@ApiOperation"#).unwrap()
});
static VALIDATION_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bvalidat|\bjoi\b|\byup\b|\bzod\b|pydantic|BaseModel|marshmallow|class-validator").unwrap()
});
static ERROR_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)errorhandler|exception_handler|error.*handler|HTTPException|@Catch\(").unwrap()
});
static CORS_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bcors\b|CORSMiddleware").unwrap());
static RATE_LIMIT_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)rate.?limit|throttl|slowapi").unwrap());
static SECURITY_MIDDLEWARE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bhelmet\b|csrf|talisman").unwrap());
static VERSIONED_PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"/v\d+(?:/|$)").unwrap());

static PLURAL_RESOURCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"/[a-z]+s(?:/|$)").unwrap());
static NESTED_RESOURCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/[a-z]+/(?:\d+|\{[^}]+\}|:\w+|<[^>]+>)").unwrap()
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub method: String,
    pub path: String,
}

/// A route follows REST conventions when at least two of: plural resource
/// naming, an operation-appropriate path, a nested resource identifier
pub fn is_restful(path: &str, method: &str) -> bool {
    let mut score = 0;
    if PLURAL_RESOURCE.is_match(path) {
        score += 1;
    }
    let operations: &[&str] = match method.to_lowercase().as_str() {
        "get" => &["list", "retrieve"],
        "post" => &["create"],
        "put" => &["update", "replace"],
        "patch" => &["partial_update"],
        "delete" => &["delete"],
        _ => &[],
    };
    let lower = path.to_lowercase();
    if operations.iter().any(|op| lower.contains(op)) {
        score += 1;
    }
    if NESTED_RESOURCE.is_match(path) {
        score += 1;
    }
    score >= 2
}

/// Route declarations in one source file
pub fn extract_routes(file_name: &str, source: &str) -> Vec<Endpoint> {
    fn endpoint(method: &str, path: Option<regex::Match<'_>>) -> Endpoint {
        Endpoint {
            method: method.to_lowercase(),
            path: path.map(|m| m.as_str().to_string()).unwrap_or_default(),
        }
    }

    if file_name.ends_with(".py") {
        let mut routes: Vec<Endpoint> = PY_ROUTE
            .captures_iter(source)
            .map(|c| {
                let method = if &c[1] == "route" { "get" } else { &c[1] };
                endpoint(method, c.get(2))
            })
            .collect();
        if file_name.ends_with("urls.py") {
            routes.extend(DJANGO_ROUTE.captures_iter(source).map(|c| endpoint("get", c.get(1))));
        }
        routes
    } else {
        JS_ROUTE
            .captures_iter(source)
            .map(|c| endpoint(&c[1], c.get(2)))
            .chain(NEST_ROUTE.captures_iter(source).map(|c| endpoint(&c[1], c.get(2))))
            .collect()
    }
}

/// Counts accumulated over specifications and route files
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiStats {
    pub endpoints: usize,
    pub documented: usize,
    pub authenticated: usize,
    pub restful: usize,
    pub versioned: bool,
    pub features: BTreeSet<&'static str>,
}

impl ApiStats {
    /// Fold in an OpenAPI/Swagger document
    pub fn add_spec(&mut self, spec: &Value) {
        let global_security = spec.get("security").is_some_and(|s| !is_empty(s));
        if spec
            .pointer("/components/securitySchemes")
            .or_else(|| spec.get("securityDefinitions"))
            .is_some_and(|s| !is_empty(s))
        {
            self.features.insert("Authentication schemes defined");
        }

        let Some(paths) = spec.get("paths").and_then(Value::as_object) else {
            return;
        };
        for (path, operations) in paths {
            if VERSIONED_PATH.is_match(path) {
                self.versioned = true;
            }
            let Some(operations) = operations.as_object() else { continue };
            for (method, details) in operations {
                if !HTTP_METHODS.contains(&method.to_lowercase().as_str()) {
                    continue;
                }
                self.endpoints += 1;
                if details.get("summary").is_some() || details.get("description").is_some() {
                    self.documented += 1;
                }
                if global_security || details.get("security").is_some_and(|s| !is_empty(s)) {
                    self.authenticated += 1;
                }
                if is_restful(path, method) {
                    self.restful += 1;
                }
            }
        }
        if spec
            .pointer("/info/version")
            .is_some_and(|v| !v.is_null())
        {
            self.versioned = true;
        }
    }

    /// Fold in the routes and markers of one source file
    pub fn add_source(&mut self, routes: &[Endpoint], source: &str) {
        self.endpoints += routes.len();
        if AUTH_MARKER.is_match(source) {
            self.authenticated += routes.len();
            self.features.insert("Authentication implemented");
        }
        if DOC_MARKER.is_match(source) {
            self.documented += routes.len();
        }
        for route in routes {
            if is_restful(&route.path, &route.method) {
                self.restful += 1;
            }
            if VERSIONED_PATH.is_match(&route.path) {
                self.versioned = true;
            }
        }

        let markers: [(&Lazy<Regex>, &'static str); 5] = [
            (&VALIDATION_MARKER, "Input validation"),
            (&ERROR_MARKER, "Error handling"),
            (&CORS_MARKER, "CORS configuration"),
            (&RATE_LIMIT_MARKER, "Rate limiting"),
            (&SECURITY_MIDDLEWARE, "Security middleware"),
        ];
        for (pattern, feature) in markers {
            if pattern.is_match(source) {
                self.features.insert(feature);
            }
        }
    }

    /// `20` for having an API, then documentation (25), security features
    /// (25), REST conventions (15) and authentication (15)
    pub fn score(&self) -> f64 {
        let ratio = |n: usize| n as f64 / self.endpoints.max(1) as f64;
        let mut score = 20.0;
        score += (ratio(self.documented) * 25.0).min(25.0);
        score += (self.features.len() as f64 * 8.0).min(25.0);
        score += (self.restful as f64 * 3.0).min(15.0);
        score += (ratio(self.authenticated) * 15.0).min(15.0);
        score.min(100.0)
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

fn parse_spec(name: &str, text: &str) -> Result<Value> {
    if name.ends_with(".json") {
        Ok(serde_json::from_str(text)?)
    } else {
        serde_yaml::from_str(text).map_err(|e| Error::parse(name, e.to_string()))
    }
}

pub struct ApiQualityAnalyzer;

impl ApiQualityAnalyzer {
    fn manifest_frameworks(ctx: &RepoContext) -> BTreeSet<&'static str> {
        let Some(text) = ctx.read(&ctx.root.join("package.json")) else {
            return BTreeSet::new();
        };
        let Ok(package) = serde_json::from_str::<Value>(&text) else {
            return BTreeSet::new();
        };
        let declared: Vec<&String> = ["dependencies", "devDependencies"]
            .iter()
            .filter_map(|k| package.get(*k).and_then(Value::as_object))
            .flat_map(|deps| deps.keys())
            .collect();
        SCRIPT_FRAMEWORKS
            .iter()
            .filter(|(pkg, _)| declared.iter().any(|d| d.as_str() == *pkg))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl RepoAnalyzer for ApiQualityAnalyzer {
    fn name(&self) -> &'static str {
        "api_quality"
    }

    fn description(&self) -> &'static str {
        "Analyzing API quality"
    }

    fn analyze(&self, ctx: &RepoContext) -> Result<AnalyzerOutput> {
        let mut frameworks = Self::manifest_frameworks(ctx);
        let mut specs = Vec::new();
        let mut route_files = Vec::new();

        for path in ctx.all_files()? {
            let display = ctx.display_path(&path);
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            if SPEC_FILES.contains(&file_name) {
                specs.push(path);
                continue;
            }
            let is_source = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| SOURCE_EXTENSIONS.contains(&e));
            if !is_source {
                continue;
            }
            let Some(source) = ctx.read(&path) else { continue };

            if display.ends_with(".py") {
                for caps in PY_FRAMEWORK_IMPORT.captures_iter(&source) {
                    if let Some((_, name)) = PYTHON_FRAMEWORKS.iter().find(|(m, _)| *m == &caps[1]) {
                        frameworks.insert(*name);
                    }
                }
            } else {
                let imports = js_imports(&source);
                for (pkg, name) in SCRIPT_FRAMEWORKS {
                    if imports.contains(*pkg) {
                        frameworks.insert(*name);
                    }
                }
            }

            let routes = extract_routes(&display, &source);
            if !routes.is_empty() {
                route_files.push((routes, source));
            }
        }

        if frameworks.is_empty() && specs.is_empty() {
            let values = json!({
                "has_api": false,
                "api_type": null,
                "frameworks": [],
                "api_specs": [],
                "endpoints_count": 0,
                "api_quality_score": 0.0,
                "api_quality": "No API detected",
                "recommendations": ["Consider adding API documentation if this is an API service"]
            });
            return Ok(AnalyzerOutput::section("api_quality", into_map(values)));
        }

        let mut stats = ApiStats::default();
        let mut issues = Vec::new();
        let spec_names: Vec<String> = specs.iter().map(|p| ctx.display_path(p)).collect();
        for (path, name) in specs.iter().zip(&spec_names) {
            let Some(text) = ctx.read(path) else { continue };
            match parse_spec(name, &text) {
                Ok(spec) => stats.add_spec(&spec),
                Err(e) => {
                    debug!("Unparseable API spec {}: {}", name, e);
                    issues.push(format!("Failed to parse API spec {}", name));
                }
            }
        }
        if !frameworks.is_empty() {
            for (routes, source) in &route_files {
                stats.add_source(routes, source);
            }
        }

        let score = stats.score();
        let api_type = match frameworks.iter().next() {
            Some(name) => name.to_string(),
            None => "REST API with specification".to_string(),
        };

        let mut recommendations = Vec::new();
        if stats.documented == 0 {
            recommendations.push("Add API documentation (OpenAPI/Swagger)");
        }
        if stats.authenticated == 0 {
            recommendations.push("Implement authentication for API endpoints");
        }
        if stats.features.is_empty() {
            recommendations.push("Add security features (CORS, input validation, etc.)");
        }
        if stats.restful < 5 {
            recommendations.push("Follow RESTful API design principles");
        }
        if !stats.versioned {
            recommendations.push("Version the API (e.g. /v1/ paths)");
        }

        let values = json!({
            "has_api": true,
            "api_type": api_type,
            "frameworks": frameworks,
            "api_specs": spec_names,
            "endpoints_count": stats.endpoints,
            "documented_endpoints": stats.documented,
            "authenticated_endpoints": stats.authenticated,
            "restful_compliance": stats.restful,
            "versioned": stats.versioned,
            "security_features": stats.features,
            "api_quality_score": score,
            "api_quality": quality_label(score),
            "issues": issues,
            "recommendations": recommendations
        });
        Ok(AnalyzerOutput::section("api_quality", into_map(values)))
    }
}
