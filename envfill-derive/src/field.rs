use darling::FromField;
use syn::{Expr, ExprLit, Field, Ident, Lit, LitStr, Meta, Type, Visibility, ext::IdentExt};

pub struct EnvFieldReceiver {
    pub ident: Ident,
    pub ty: Type,
    pub vis: Visibility,
    /// Explicit key, already reduced to a non-empty first tag segment.
    pub key: Option<String>,
    pub skip: bool,
}

impl EnvFieldReceiver {
    /// The declared name, without any `r#` prefix.
    pub fn name(&self) -> String {
        self.ident.unraw().to_string()
    }

    pub fn key(&self) -> String {
        self.key.clone().unwrap_or_else(|| self.name())
    }

    /// Only fields visible outside the defining crate are populated.
    pub fn is_eligible(&self) -> bool {
        matches!(self.vis, Visibility::Public(_)) && !self.skip
    }
}

/// `"KEY,reserved"` -> `Some("KEY")`, `",reserved"` -> `None`.
fn tag_key(tag: &str) -> Option<String> {
    tag.split(',')
        .next()
        .filter(|key| !key.is_empty())
        .map(ToOwned::to_owned)
}

impl FromField for EnvFieldReceiver {
    fn from_field(field: &Field) -> darling::Result<Self> {
        let ident = field.ident.clone().ok_or_else(|| {
            darling::Error::custom("FromEnv can only be derived for structs with named fields")
                .with_span(field)
        })?;

        let mut key: Option<LitStr> = None;
        let mut skip = false;
        let mut errors = darling::Error::accumulator();

        for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("env")) {
            let mut set_key = |lit: LitStr, errors: &mut darling::error::Accumulator| {
                if key.is_some() {
                    errors.push(darling::Error::custom("duplicate env key").with_span(&lit));
                } else {
                    key = Some(lit);
                }
            };

            match &attr.meta {
                // #[env = "KEY,..."]
                Meta::NameValue(name_value) => match &name_value.value {
                    Expr::Lit(ExprLit {
                        lit: Lit::Str(lit), ..
                    }) => set_key(lit.clone(), &mut errors),
                    other => errors.push(
                        darling::Error::custom("expected a string literal").with_span(other),
                    ),
                },
                // #[env(key = "...", skip)]
                Meta::List(_) => {
                    let parsed = attr.parse_nested_meta(|meta| {
                        if meta.path.is_ident("key") {
                            let lit: LitStr = meta.value()?.parse()?;
                            set_key(lit, &mut errors);
                        } else if meta.path.is_ident("skip") {
                            if !meta.input.is_empty() && !meta.input.peek(syn::Token![,]) {
                                return Err(meta.error("expected `skip` without a value"));
                            }
                            skip = true;
                        } else {
                            return Err(meta.error("unsupported env attribute"));
                        }
                        Ok(())
                    });
                    if let Err(err) = parsed {
                        errors.push(err.into());
                    }
                }
                Meta::Path(path) => errors.push(
                    darling::Error::custom(
                        "expected `#[env = \"KEY\"]`, `#[env(key = \"KEY\")]` or `#[env(skip)]`",
                    )
                    .with_span(path),
                ),
            }
        }

        if skip && key.is_some() {
            errors.push(
                darling::Error::custom("`skip` cannot be combined with a key").with_span(&ident),
            );
        }

        errors.finish_with(EnvFieldReceiver {
            ident,
            ty: field.ty.clone(),
            vis: field.vis.clone(),
            key: key.and_then(|lit| tag_key(&lit.value())),
            skip,
        })
    }
}
