/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use proc_macro::TokenStream;

use quote::quote;
use syn::{parse_macro_input, ItemFn};

/// Runs an `async fn` test on a multi-thread Tokio runtime.
///
/// The body may return `()` or any `Result`; the return value of the async body is
/// returned from the generated `#[test]` function, so `anyhow::Result<()>` works the
/// way it does for plain tests.
#[proc_macro_attribute]
pub fn hexameter_test(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    let vis = &input.vis;
    let sig = &input.sig;
    let body = &input.block;
    let attrs = &input.attrs;
    let name = &sig.ident;
    let inputs = &sig.inputs;
    let output = &sig.output;

    let async_name = syn::Ident::new(&format!("__{}_async", name), name.span());

    let expanded = quote! {
        #[test]
        #(#attrs)*
        #vis fn #name() #output {
            use std::sync::atomic::{AtomicBool, Ordering};
            use std::sync::Arc;
            use std::panic;
            use ::hexameter_test::__private::parking_lot::Mutex;
            use ::hexameter_test::__private::tracing;

            #[derive(Clone, Default)]
            struct PanicInfo {
                occurred: Arc<AtomicBool>,
                message: Arc<Mutex<Option<String>>>,
                location: Arc<Mutex<Option<String>>>,
            }

            let panic_info = Arc::new(PanicInfo::default());
            let panic_info_clone = Arc::clone(&panic_info);

            let orig_hook = panic::take_hook();
            panic::set_hook(Box::new(move |info| {
                panic_info_clone.occurred.store(true, Ordering::SeqCst);
                let message = info
                    .payload()
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| info.payload().downcast_ref::<String>().cloned());
                *panic_info_clone.message.lock() = message.clone();
                *panic_info_clone.location.lock() = info
                    .location()
                    .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()));
                let cleaned_message = message
                    .unwrap_or_else(|| "No error message".to_string())
                    .trim()
                    .replace('\n', " ");
                tracing::error!("Panic: {}", cleaned_message);
                orig_hook(info);
            }));

            let runtime = ::hexameter_test::__private::tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .expect("failed to build test runtime");

            let result = runtime.block_on(async {
                let test_span = tracing::info_span!("hexameter_test", name = stringify!(#name));
                let _enter = test_span.enter();
                #async_name().await
            });

            if panic_info.occurred.load(Ordering::SeqCst) {
                let message = panic_info.message.lock().clone();
                let location = panic_info
                    .location
                    .lock()
                    .clone()
                    .unwrap_or_else(|| "unknown location".to_string());
                let cleaned_message = message
                    .unwrap_or_else(|| "No error message".to_string())
                    .trim()
                    .replace('\n', " ");
                panic!("Panic at {}: {}", location, cleaned_message);
            }

            result
        }

        async fn #async_name(#inputs) #output #body
    };

    expanded.into()
}
