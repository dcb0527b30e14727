use grafana_ons_datasource::OnsPlugin;

#[grafana_plugin_sdk::main(services(data, diagnostics), init_subscriber = true)]
async fn plugin() -> OnsPlugin {
    OnsPlugin::new().expect("register plugin metrics")
}
