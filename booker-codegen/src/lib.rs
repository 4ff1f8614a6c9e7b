use proc_macro::TokenStream;
use quote::quote;
use quote::quote_spanned;
use syn::spanned::Spanned;

/// Turns `async fn name(config: BookerConfiguration)` into a `#[test]` that runs against a
/// fresh stub booker. An optional configuration function may adjust the configuration first.
#[proc_macro_attribute]
pub fn stub_booker_test(attrs: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as syn::ItemFn);
    let args = syn::parse_macro_input!(attrs as syn::AttributeArgs);

    if let Err(stream) = validate_signature(&input.sig) {
        return stream.into();
    }

    let configure = match args.as_slice() {
        [] => quote! {},
        [syn::NestedMeta::Meta(syn::Meta::Path(function_path))] => quote! {
            #function_path(&mut __booker_configuration);
        },
        _ => {
            return quote! {
                compile_error!("The only argument should be a configuration function!");
            }
            .into();
        }
    };

    let attributes = &input.attrs;
    let name = &input.sig.ident;
    let mut inner_signature = input.sig.clone();
    inner_signature.ident = syn::Ident::new("__stub_booker_case", name.span());
    let block = &input.block;

    let output = quote! {
        #[test]
        #(#attributes)*
        fn #name() {
            #inner_signature #block

            let __stub_booker = booker::stub_server::StubServer::start()
                .unwrap_or_else(|e| panic!("Stub booker error: {}", e));
            let mut __booker_configuration =
                booker::BookerConfiguration::new(__stub_booker.base_url());
            #configure

            booker::stub_server::run_test(__stub_booker_case(__booker_configuration));
        }
    };

    TokenStream::from(output)
}

fn validate_signature(signature: &syn::Signature) -> Result<(), proc_macro2::TokenStream> {
    if signature.asyncness.is_none() {
        return Err(quote_spanned! {signature.fn_token.span()=>
            compile_error!("A stub booker test should be an async fn!");
        });
    }

    if signature.inputs.len() != 1 {
        return Err(quote_spanned! {signature.inputs.span()=>
            compile_error!("A stub booker test takes exactly one BookerConfiguration argument!");
        });
    }

    Ok(())
}
